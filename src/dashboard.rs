//! The single-city dashboard: summary cards plus interactive charts.
//!
//! The model is recomputed from a fresh fetch on every build (subject only to
//! the fetcher's short TTL cache); there is no incremental state. Chart
//! rendering lives behind the `dashboard` feature so the library core does
//! not depend on the plotting stack.

use crate::error::AqimonError;
use crate::monitor::AqiMonitor;
use crate::types::category::AqiCategory;
use crate::types::history::History;
use crate::types::reading::Snapshot;
use chrono::Duration;

/// Everything one dashboard page load displays for a city.
///
/// A failed coordinate lookup or an empty upstream surfaces as a typed error
/// ([`AqimonError::UnknownCity`] / [`AqimonError::NoData`]) that callers
/// render inline; the session itself keeps running.
#[derive(Debug, Clone)]
pub struct DashboardModel {
    pub city: String,
    pub snapshot: Snapshot,
    pub color: &'static str,
    pub recommendation: &'static str,
    /// Mean PM2.5 over the trailing 24 hours.
    pub mean_24h: Option<f64>,
    /// Peak PM2.5 over the trailing 24 hours.
    pub peak_24h: Option<f64>,
    /// 24-hour mean versus the prior 24 hours; positive means worsening.
    pub trend_delta: Option<f64>,
    pub history: History,
}

impl DashboardModel {
    /// Fetches a two-day history for `city` and derives the dashboard model.
    pub async fn build(monitor: &AqiMonitor, city: &str) -> Result<DashboardModel, AqimonError> {
        let history = monitor
            .city_history()
            .city(city)
            // Two days so the trend delta has a comparison window.
            .lookback(Duration::hours(48))
            .call()
            .await?;
        Self::from_history(city, history)
    }

    /// Derives the model from an already-fetched history.
    pub fn from_history(city: &str, history: History) -> Result<DashboardModel, AqimonError> {
        let snapshot = history
            .snapshot()
            .ok_or_else(|| AqimonError::NoData(city.to_string()))?;
        let category = snapshot.category;
        Ok(DashboardModel {
            city: city.to_string(),
            snapshot,
            color: category.color(),
            recommendation: category.recommendation(),
            mean_24h: history.mean_pm25(Duration::hours(24)),
            peak_24h: history.peak_pm25(Duration::hours(24)),
            trend_delta: history.trend_delta(),
            history,
        })
    }

    pub fn category(&self) -> AqiCategory {
        self.snapshot.category
    }

    /// The summary card lines, ready for console or page rendering.
    pub fn summary_cards(&self) -> Vec<String> {
        let fmt_opt = |v: Option<f64>| match v {
            Some(v) => format!("{:.1}", v),
            None => "n/a".to_string(),
        };
        let trend = match self.trend_delta {
            Some(d) if d > 0.0 => format!("+{:.1} vs prior 24h (worsening)", d),
            Some(d) => format!("{:.1} vs prior 24h (improving)", d),
            None => "n/a".to_string(),
        };
        vec![
            format!(
                "Current PM2.5: {:.1} ({}) [{}]",
                self.snapshot.pm2_5,
                self.category(),
                self.color
            ),
            format!("24h average: {}", fmt_opt(self.mean_24h)),
            format!("24h peak: {}", fmt_opt(self.peak_24h)),
            format!("Trend: {}", trend),
            format!("Advice: {}", self.recommendation),
        ]
    }

    /// Renders the PM2.5 trend and the multi-pollutant comparison as
    /// interactive plots (opened in the browser).
    #[cfg(feature = "dashboard")]
    pub fn render(&self) -> Result<(), AqimonError> {
        use plotlars::{Line, Plot, Rgb, Text, TimeSeriesPlot};

        let frame = self.history.frame().map_err(AqimonError::Dashboard)?;
        let trend_title = format!("PM2.5 Level — {}", self.city);
        let breakdown_title = format!("Pollutant Breakdown — {}", self.city);

        TimeSeriesPlot::builder()
            .data(&frame)
            .x("timestamp")
            .y("pm2_5")
            .colors(vec![Rgb(230, 126, 34)])
            .lines(vec![Line::Solid])
            .plot_title(Text::from(trend_title.as_str()).font("Arial").size(18))
            .x_title("time")
            .y_title("µg/m³")
            .build()
            .plot();

        TimeSeriesPlot::builder()
            .data(&frame)
            .x("timestamp")
            .y("pm2_5")
            .additional_series(vec!["pm10", "no2", "o3", "so2"])
            .plot_title(Text::from(breakdown_title.as_str()).font("Arial").size(18))
            .x_title("time")
            .y_title("µg/m³")
            .build()
            .plot();

        Ok(())
    }
}
