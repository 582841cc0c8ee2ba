//! This module provides the main entry point for fetching air quality data.
//! It allows fetching normalized hourly pollutant histories either for a
//! named catalog city or for raw geographical coordinates.

use crate::catalog::city_catalog::CityCatalog;
use crate::error::AqimonError;
use crate::providers::fetcher::HistoryFetcher;
use crate::providers::kind::ProviderKind;
use crate::types::history::History;
use bon::bon;
use chrono::Duration;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64`.
///
/// # Examples
///
/// ```
/// use aqimon::LatLon;
///
/// let new_delhi = LatLon(28.6139, 77.2090);
/// assert_eq!(new_delhi.0, 28.6139); // Latitude
/// assert_eq!(new_delhi.1, 77.2090); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// The main client for fetching air quality histories.
///
/// Owns the city catalog (loaded once, immutable) and the provider-backed
/// [`HistoryFetcher`]. Construct one per process and pass it by reference to
/// the reporter and dashboard; there is no global state.
///
/// # Examples
///
/// ```no_run
/// # use aqimon::{AqiMonitor, AqimonError, CityCatalog, ProviderKind};
/// # async fn run() -> Result<(), AqimonError> {
/// let catalog = CityCatalog::load("India_Cities.csv");
/// let monitor = AqiMonitor::new(ProviderKind::OpenMeteo, catalog)?;
/// let history = monitor.city_history().city("New Delhi").call().await?;
/// println!("{} hourly readings", history.len());
/// # Ok(())
/// # }
/// ```
pub struct AqiMonitor {
    catalog: CityCatalog,
    fetcher: HistoryFetcher,
}

#[bon]
impl AqiMonitor {
    /// Creates a client for the given provider, reading any mandated
    /// credential from the provider's environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProviderError::MissingApiKey`] (wrapped) when the
    /// provider requires a credential that is not configured; treat this as a
    /// fatal startup error.
    pub fn new(provider: ProviderKind, catalog: CityCatalog) -> Result<AqiMonitor, AqimonError> {
        Ok(AqiMonitor {
            catalog,
            fetcher: HistoryFetcher::new(provider)?,
        })
    }

    /// Creates a client around an already-configured fetcher.
    pub fn with_fetcher(fetcher: HistoryFetcher, catalog: CityCatalog) -> AqiMonitor {
        AqiMonitor { catalog, fetcher }
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub fn fetcher(&self) -> &HistoryFetcher {
        &self.fetcher
    }

    /// Fetches the hourly history for a named catalog city.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.city(&str)`: **Required.** The catalog city name (trimmed lookup).
    /// * `.lookback(Duration)`: Optional. How far back to request; clamped to
    ///   what the provider supports. Defaults to 1 day.
    ///
    /// # Errors
    ///
    /// Returns [`AqimonError::UnknownCity`] if the name is not in the catalog,
    /// or a wrapped [`crate::ProviderError`] for transport-level failures.
    /// An upstream with no data yields an **empty history**, not an error.
    #[builder]
    pub async fn city_history(
        &self,
        city: &str,
        lookback: Option<Duration>,
    ) -> Result<History, AqimonError> {
        let location = self
            .catalog
            .coords(city)
            .ok_or_else(|| AqimonError::UnknownCity(city.to_string()))?;
        self.location_history()
            .location(location)
            .maybe_lookback(lookback)
            .call()
            .await
    }

    /// Fetches the hourly history for raw coordinates.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The coordinates to query.
    /// * `.lookback(Duration)`: Optional. Defaults to 1 day.
    #[builder]
    pub async fn location_history(
        &self,
        location: LatLon,
        lookback: Option<Duration>,
    ) -> Result<History, AqimonError> {
        let lookback = lookback.unwrap_or_else(|| Duration::days(1));
        Ok(self.fetcher.fetch(location, lookback).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fetcher::HistoryFetcher;

    fn keyless_monitor() -> AqiMonitor {
        let fetcher = HistoryFetcher::with_api_key(ProviderKind::OpenMeteo, None).unwrap();
        AqiMonitor::with_fetcher(fetcher, CityCatalog::default())
    }

    #[tokio::test]
    async fn unknown_city_is_a_typed_error() {
        let monitor = keyless_monitor();
        let err = monitor
            .city_history()
            .city("Atlantis")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, AqimonError::UnknownCity(name) if name == "Atlantis"));
    }

    #[test]
    fn keyed_provider_without_credential_fails_construction() {
        // Force-absent credential regardless of the test environment.
        let err = HistoryFetcher::with_api_key(ProviderKind::OpenWeather, None).unwrap_err();
        let err = AqimonError::from(err);
        assert!(matches!(err, AqimonError::Provider(_)));
    }
}
