use crate::errors::ChartError;
use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use std::ops::Range;
use tibber_loader::gql::queries::{PriceForecast, PriceRecord};

/// Local time zone of the displayed prices
pub const BERLIN: Tz = chrono_tz::Europe::Berlin;

/// Length of one price bucket
pub fn bucket_length() -> TimeDelta {
    TimeDelta::hours(1)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub start_time: DateTime<Tz>,
    pub total_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The bucket the current time falls into
pub struct HighlightSpan {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

#[derive(Debug, Clone)]
/// Chronological prices followed by one synthetic point an hour after the
/// last real one, carrying the same price, so a post-step trace gets its
/// final horizontal edge.
pub struct ExtendedSeries {
    points: Vec<PricePoint>,
}

impl ExtendedSeries {
    /// Concatenates `today` and `tomorrow` in that order and converts every
    /// start time into `tz`.
    pub fn build(
        today: &[PriceRecord],
        tomorrow: &[PriceRecord],
        tz: Tz,
    ) -> Result<Self, ChartError> {
        let mut points: Vec<PricePoint> = today
            .iter()
            .chain(tomorrow)
            .map(|record| PricePoint {
                start_time: record.starts_at.with_timezone(&tz),
                total_price: record.total,
            })
            .collect();

        let last = *points.last().ok_or(ChartError::EmptySeries)?;
        points.push(PricePoint {
            start_time: last.start_time + bucket_length(),
            total_price: last.total_price,
        });

        Ok(ExtendedSeries { points })
    }

    pub fn from_forecast(forecast: &PriceForecast, tz: Tz) -> Result<Self, ChartError> {
        Self::build(&forecast.today, &forecast.tomorrow, tz)
    }

    /// All points, the synthetic trailing one included
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Points that correspond to an actual price bucket
    pub fn real_points(&self) -> &[PricePoint] {
        &self.points[..self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true, a series always holds the synthetic point
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn time_range(&self) -> Range<DateTime<Tz>> {
        self.first().start_time..self.last().start_time
    }

    pub fn max_price(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.total_price)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min_price(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.total_price)
            .fold(f64::INFINITY, f64::min)
    }

    /// Vertices of the post-step trace: each price holds from its own start
    /// time until the next start time.
    pub fn step_path(&self, scale: f64) -> Vec<(DateTime<Tz>, f64)> {
        let mut path = Vec::with_capacity(self.points.len() * 2);
        for (i, point) in self.points.iter().enumerate() {
            let value = point.total_price * scale;
            path.push((point.start_time, value));
            if let Some(next) = self.points.get(i + 1) {
                path.push((next.start_time, value));
            }
        }
        path
    }

    /// First real bucket whose `[start, start + 1h)` contains `now`
    pub fn current_bucket(&self, now: DateTime<Tz>) -> Option<HighlightSpan> {
        self.real_points()
            .iter()
            .find(|p| p.start_time <= now && now < p.start_time + bucket_length())
            .map(|p| HighlightSpan {
                start: p.start_time,
                end: p.start_time + bucket_length(),
            })
    }
}
