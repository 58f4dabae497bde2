pub mod errors;
pub mod finish;
pub mod render;
pub mod series;

pub use errors::ChartError;
pub use finish::finish;
pub use render::{render, ChartOptions};
pub use series::{ExtendedSeries, HighlightSpan, PricePoint, BERLIN};
