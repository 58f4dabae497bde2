use crate::{
    errors::ChartError,
    series::{ExtendedSeries, HighlightSpan},
};
use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use image::RgbImage;
use log::debug;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

/// 8 x 6 inch at 150 dpi
pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 900;

/// Price in ct/kWh the display variant marks with a dashed line
pub const REFERENCE_PRICE_CT: f64 = 32.74;

const FONT: &str = "sans-serif";

/// Distance of the rotated tick labels from the x axis
const X_TICK_SIZE: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRotation {
    Clockwise,
    CounterClockwise,
}

impl LabelRotation {
    fn transform(self) -> FontTransform {
        match self {
            LabelRotation::Clockwise => FontTransform::Rotate90,
            LabelRotation::CounterClockwise => FontTransform::Rotate270,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// Already in chart units
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Everything the e-ink display chart and the file snapshot do differently
pub struct ChartOptions {
    pub title: &'static str,
    pub y_desc: &'static str,
    /// Multiplier from the API unit (EUR/kWh) to the y axis unit
    pub price_scale: f64,
    /// Fixed y range, or `None` to fit the prices
    pub y_range: Option<Range<f64>>,
    pub reference_line: Option<ReferenceLine>,
    pub x_label_rotation: LabelRotation,
    /// `strftime` format of the generation stamp
    pub timestamp_format: &'static str,
    /// Running hour's price in EUR/kWh, stamped over the chart
    pub current_price: Option<f64>,
}

impl ChartOptions {
    pub fn display(current_price: f64) -> Self {
        ChartOptions {
            title: "Tibber Electricity Prices",
            y_desc: "Price (ct/kWh)",
            price_scale: 100.0,
            y_range: Some(0.0..50.0),
            reference_line: Some(ReferenceLine {
                value: REFERENCE_PRICE_CT,
                label: format!("{REFERENCE_PRICE_CT:.2} ct/kWh"),
            }),
            x_label_rotation: LabelRotation::Clockwise,
            timestamp_format: "%Y.%m.%d %H:%M:%S",
            current_price: Some(current_price),
        }
    }

    pub fn snapshot() -> Self {
        ChartOptions {
            title: "Tibber Electricity Prices (Step Diagram)",
            y_desc: "Price (€/kWh)",
            price_scale: 1.0,
            y_range: None,
            reference_line: None,
            x_label_rotation: LabelRotation::CounterClockwise,
            timestamp_format: "%Y-%m-%d",
            current_price: None,
        }
    }

    pub fn y_range(&self, series: &ExtendedSeries) -> Range<f64> {
        match &self.y_range {
            Some(range) => range.clone(),
            None => {
                let low = (series.min_price() * self.price_scale).min(0.0);
                let high = (series.max_price() * self.price_scale).max(0.0);
                let padding = (high - low) * 0.1;
                if padding <= 0.0 {
                    0.0..1.0
                } else if low < 0.0 {
                    low - padding..high + padding
                } else {
                    0.0..high + padding
                }
            }
        }
    }
}

/// Time axis, stretched past the trailing point so it still gets a tick
pub fn x_range(series: &ExtendedSeries) -> Range<DateTime<Tz>> {
    let range = series.time_range();
    range.start..range.end + TimeDelta::minutes(10)
}

pub fn tick_label(time: &DateTime<Tz>) -> String {
    time.format("%H:%M").to_string()
}

pub fn generated_on(now: &DateTime<Tz>, format: &str) -> String {
    format!("Generated on: {}", now.format(format))
}

pub fn price_overlay(current_price: f64) -> String {
    format!("{:.2} ct/kWh", current_price * 100.0)
}

/// Draws the step chart into an RGB raster of `CHART_WIDTH` x `CHART_HEIGHT`.
pub fn render(
    series: &ExtendedSeries,
    now: DateTime<Tz>,
    options: &ChartOptions,
) -> Result<RgbImage, ChartError> {
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    let highlight = series.current_bucket(now);
    debug!("Highlighted bucket: {:?}", highlight);

    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let y_range = options.y_range(series);
        let mut chart = ChartBuilder::on(&root)
            .caption(options.title, (FONT, 28).into_font().color(&BLACK))
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range(series), y_range.clone())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .set_tick_mark_size(LabelAreaPosition::Bottom, X_TICK_SIZE)
            .x_labels(series.len())
            .x_label_formatter(&tick_label)
            .x_label_style(
                (FONT, 13)
                    .into_font()
                    .color(&BLACK)
                    .transform(options.x_label_rotation.transform()),
            )
            .y_label_style((FONT, 14).into_font().color(&BLACK))
            .bold_line_style(BLACK.mix(0.3))
            .light_line_style(TRANSPARENT)
            .x_desc("Time")
            .y_desc(options.y_desc)
            .axis_desc_style((FONT, 16).into_font().color(&BLACK))
            .draw()?;

        if let Some(HighlightSpan { start, end }) = highlight {
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(start, y_range.start), (end, y_range.end)],
                    BLACK.mix(0.3).filled(),
                )))?
                .label("Current Hour")
                .legend(|(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 20, y + 6)], BLACK.mix(0.3).filled())
                });
        }

        chart
            .draw_series(LineSeries::new(
                series.step_path(options.price_scale),
                BLACK.stroke_width(2),
            ))?
            .label("Electricity Price")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

        if let Some(reference) = &options.reference_line {
            let range = x_range(series);
            chart
                .draw_series(DashedLineSeries::new(
                    vec![(range.start, reference.value), (range.end, reference.value)],
                    10,
                    6,
                    BLACK.mix(0.5).stroke_width(2),
                ))?
                .label(reference.label.as_str())
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], BLACK.mix(0.5).stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(TRANSPARENT)
            .border_style(TRANSPARENT)
            .label_font((FONT, 16).into_font().color(&BLACK))
            .draw()?;

        // Texts are placed in fractions of the plotting area.
        let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
        let at = |fx: f64, fy: f64| {
            (
                x_pixels.start + (f64::from(x_pixels.end - x_pixels.start) * fx) as i32,
                y_pixels.end - (f64::from(y_pixels.end - y_pixels.start) * fy) as i32,
            )
        };

        root.draw(&Text::new(
            generated_on(&now, options.timestamp_format),
            at(0.95, 0.01),
            (FONT, 14)
                .into_font()
                .color(&BLACK.mix(0.5))
                .pos(Pos::new(HPos::Right, VPos::Bottom)),
        ))?;

        if let Some(current_price) = options.current_price {
            root.draw(&Text::new(
                price_overlay(current_price),
                at(0.5, 0.2),
                (FONT, 56)
                    .into_font()
                    .style(FontStyle::Bold)
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            ))?;
        }

        root.present()?;
    }

    RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer).ok_or(ChartError::InvalidBuffer)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::series::BERLIN;
    use chrono::TimeZone;
    use tibber_loader::gql::queries::PriceRecord;

    fn series(prices: &[f64]) -> ExtendedSeries {
        let today: Vec<PriceRecord> = prices
            .iter()
            .enumerate()
            .map(|(hour, total)| PriceRecord {
                total: *total,
                starts_at: DateTime::parse_from_rfc3339(&format!(
                    "2024-01-01T{hour:02}:00:00+01:00"
                ))
                .unwrap(),
            })
            .collect();
        ExtendedSeries::build(&today, &[], BERLIN).unwrap()
    }

    #[test]
    fn test_display_preset() {
        let options = ChartOptions::display(0.2953);

        assert_eq!(options.y_range(&series(&[0.9])), 0.0..50.0);
        assert_eq!(options.price_scale, 100.0);
        assert_eq!(options.reference_line.unwrap().label, "32.74 ct/kWh");
        assert_eq!(options.current_price, Some(0.2953));
    }

    #[test]
    fn test_snapshot_preset_fits_prices() {
        let options = ChartOptions::snapshot();

        let range = options.y_range(&series(&[0.10, 0.40, 0.20]));

        assert_eq!(range.start, 0.0);
        assert!((range.end - 0.44).abs() < 1e-9);
        assert!(options.reference_line.is_none());
        assert!(options.current_price.is_none());
        assert_eq!(options.y_range(&series(&[0.0])), 0.0..1.0);
    }

    #[test]
    fn test_snapshot_preset_keeps_negative_prices() {
        let options = ChartOptions::snapshot();

        let range = options.y_range(&series(&[-0.05, -0.10, 0.02]));

        assert!((range.start - -0.112).abs() < 1e-9);
        assert!((range.end - 0.032).abs() < 1e-9);

        let range = options.y_range(&series(&[-0.05, -0.10]));

        assert!(range.start < -0.10);
        assert!(range.end > 0.0);
    }

    #[test]
    fn test_x_range_covers_trailing_point() {
        let series = series(&[0.10, 0.20]);

        let range = x_range(&series);

        assert_eq!(range.start, series.first().start_time);
        assert!(range.end > series.last().start_time);
    }

    /// Pixel column at `hours` into a chart spanning 8 hours and 10 minutes.
    /// The plotting area runs from the y label area (20 + 60) to the right margin.
    fn column(hours: f64) -> u32 {
        let left = 80.0;
        let width = f64::from(CHART_WIDTH) - 20.0 - left;
        (left + width * hours / (8.0 + 10.0 / 60.0)) as u32
    }

    #[test]
    fn test_render_highlights_current_hour() {
        let series = series(&[0.10; 8]);
        let options = ChartOptions::display(0.29);
        let row = 450;

        let chart = render(
            &series,
            BERLIN.with_ymd_and_hms(2024, 1, 1, 5, 30, 0).unwrap(),
            &options,
        )
        .unwrap();

        assert_eq!(chart.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
        let inside = chart.get_pixel(column(5.25), row)[0];
        let outside = chart.get_pixel(column(4.25), row)[0];
        assert!(
            inside < outside,
            "band pixel {inside} is not darker than {outside}"
        );

        let chart = render(
            &series,
            BERLIN.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap(),
            &options,
        )
        .unwrap();

        assert_eq!(
            chart.get_pixel(column(5.25), row),
            chart.get_pixel(column(4.25), row)
        );
    }

    #[test]
    fn test_render_snapshot_with_negative_prices() {
        let series = series(&[0.10, -0.05, 0.02]);

        let chart = render(
            &series,
            BERLIN.with_ymd_and_hms(2024, 1, 1, 1, 15, 0).unwrap(),
            &ChartOptions::snapshot(),
        )
        .unwrap();

        assert_eq!(chart.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
    }

    #[test]
    fn test_labels() {
        let now = BERLIN.with_ymd_and_hms(2024, 1, 1, 14, 5, 9).unwrap();

        assert_eq!(tick_label(&now), "14:05");
        assert_eq!(
            generated_on(&now, ChartOptions::display(0.0).timestamp_format),
            "Generated on: 2024.01.01 14:05:09"
        );
        assert_eq!(
            generated_on(&now, ChartOptions::snapshot().timestamp_format),
            "Generated on: 2024-01-01"
        );
        assert_eq!(price_overlay(0.29534), "29.53 ct/kWh");
    }
}
