//! Selection of the concrete upstream air quality provider.

use chrono::Duration;
use std::fmt;

/// The upstream air quality API to fetch histories from.
///
/// All providers satisfy the same contract (coordinates + lookback window in,
/// normalized hourly [`crate::History`] out); the concrete one is selected by
/// configuration, not by subtyping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenWeather's air pollution history API. Requires an API key; the free
    /// tier caps the lookback window at 5 days.
    OpenWeather,
    /// Open-Meteo's air quality API. No key required. Responds with forecast
    /// hours past "now", which the normalization step discards.
    OpenMeteo,
    /// OpenAQ's community measurement API. Requires a (free) API key.
    OpenAq,
}

impl ProviderKind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenWeather => "openweather",
            ProviderKind::OpenMeteo => "open-meteo",
            ProviderKind::OpenAq => "openaq",
        }
    }

    /// Environment variable holding the provider credential, if one is mandated.
    pub(crate) fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenWeather => Some("OPENWEATHER_API_KEY"),
            ProviderKind::OpenMeteo => None,
            ProviderKind::OpenAq => Some("OPENAQ_API_KEY"),
        }
    }

    /// The longest lookback window the provider serves, if capped.
    ///
    /// Requests beyond the cap are clamped rather than rejected.
    pub(crate) fn max_lookback(&self) -> Option<Duration> {
        match self {
            ProviderKind::OpenWeather => Some(Duration::days(5)),
            ProviderKind::OpenMeteo => Some(Duration::days(92)),
            ProviderKind::OpenAq => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<ProviderKind, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openweather" => Ok(ProviderKind::OpenWeather),
            "open-meteo" | "openmeteo" => Ok(ProviderKind::OpenMeteo),
            "openaq" => Ok(ProviderKind::OpenAq),
            other => Err(format!(
                "unknown provider '{}' (expected openweather, open-meteo or openaq)",
                other
            )),
        }
    }
}
