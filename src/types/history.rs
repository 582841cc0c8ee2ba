//! The `History` time series: hourly pollutant readings for one location.

use crate::types::reading::{Reading, Snapshot};
use chrono::Duration;
use polars::prelude::*;

/// The fixed pollutant column set every provider payload is normalized into.
pub const POLLUTANT_COLUMNS: [&str; 6] = ["pm2_5", "pm10", "no2", "o3", "so2", "co"];

/// An hourly time series of pollutant readings for one location.
///
/// Invariants, established by the provider normalization pipeline:
/// timestamps are strictly increasing, exactly one hour apart, deduplicated,
/// and never in the future relative to the fetch. An empty history is the
/// well-defined "provider had nothing" result, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    readings: Vec<Reading>,
}

impl History {
    /// Wraps an already-normalized, ascending sequence of hourly readings.
    pub(crate) fn new(readings: Vec<Reading>) -> History {
        debug_assert!(
            readings.windows(2).all(|w| w[0].datetime < w[1].datetime),
            "history readings must be strictly ascending"
        );
        History { readings }
    }

    /// The empty history.
    pub fn empty() -> History {
        History::default()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// The most recent reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// The most recent reading, sanitized and classified.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.latest().map(Snapshot::from_reading)
    }

    /// Mean PM2.5 over the trailing `window`, anchored at the latest reading.
    ///
    /// Missing values are skipped rather than counted as zero. Returns `None`
    /// when the window holds no measured PM2.5 values at all.
    pub fn mean_pm25(&self, window: Duration) -> Option<f64> {
        self.window_values(window, 0)
            .fold(None::<(f64, usize)>, |acc, v| {
                let (sum, n) = acc.unwrap_or((0.0, 0));
                Some((sum + v, n + 1))
            })
            .map(|(sum, n)| sum / n as f64)
    }

    /// Peak PM2.5 over the trailing `window`, anchored at the latest reading.
    pub fn peak_pm25(&self, window: Duration) -> Option<f64> {
        self.window_values(window, 0).fold(None, |max: Option<f64>, v| {
            Some(max.map_or(v, |m| m.max(v)))
        })
    }

    /// Change of the 24-hour mean PM2.5 versus the 24 hours before that.
    ///
    /// Positive means air quality got worse. `None` when either window has no
    /// measured values (e.g. a history shorter than 25 hours).
    pub fn trend_delta(&self) -> Option<f64> {
        let recent = self.mean_pm25(Duration::hours(24))?;
        let prior = self.shifted_mean_pm25(Duration::hours(24), 24)?;
        Some(recent - prior)
    }

    /// Measured PM2.5 values within `(end - offset_hours - window, end - offset_hours]`.
    fn window_values(&self, window: Duration, offset_hours: i64) -> impl Iterator<Item = f64> + '_ {
        let end = self
            .latest()
            .map(|r| r.datetime - Duration::hours(offset_hours));
        self.readings
            .iter()
            .filter(move |r| match end {
                Some(end) => r.datetime <= end && r.datetime > end - window,
                None => false,
            })
            .filter_map(|r| r.pm2_5)
            .filter(|v| !v.is_nan())
    }

    fn shifted_mean_pm25(&self, window: Duration, offset_hours: i64) -> Option<f64> {
        let (sum, n) = self
            .window_values(window, offset_hours)
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Materializes the history as a polars `DataFrame`.
    ///
    /// Columns: `timestamp` (millisecond `Datetime`) followed by
    /// [`POLLUTANT_COLUMNS`]; missing measurements become nulls.
    pub fn frame(&self) -> PolarsResult<DataFrame> {
        let timestamps: Vec<i64> = self
            .readings
            .iter()
            .map(|r| r.datetime.timestamp_millis())
            .collect();
        let column = |name: &str, values: Vec<Option<f64>>| {
            Series::new(name.into(), values).into_column()
        };
        let df = DataFrame::new(vec![
            Series::new("timestamp".into(), timestamps).into_column(),
            column("pm2_5", self.readings.iter().map(|r| r.pm2_5).collect()),
            column("pm10", self.readings.iter().map(|r| r.pm10).collect()),
            column("no2", self.readings.iter().map(|r| r.no2).collect()),
            column("o3", self.readings.iter().map(|r| r.o3).collect()),
            column("so2", self.readings.iter().map(|r| r.so2).collect()),
            column("co", self.readings.iter().map(|r| r.co).collect()),
        ])?;
        df.lazy()
            .with_column(
                col("timestamp").cast(DataType::Datetime(TimeUnit::Milliseconds, None)),
            )
            .collect()
    }
}
