use image::ImageError;
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No prices available to chart")]
    EmptySeries,

    #[error("Failed to draw chart: {0}")]
    Draw(String),

    #[error("Rendered buffer does not match the canvas size")]
    InvalidBuffer,

    #[error("Failed to encode image: {0}")]
    Encode(#[from] ImageError),
}

impl<E> From<DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Draw(err.to_string())
    }
}
