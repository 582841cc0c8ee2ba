use crate::monitor::LatLon;
use crate::providers::error::ProviderError;
use crate::providers::kind::ProviderKind;
use crate::providers::normalize::normalize;
use crate::providers::{open_aq, open_meteo, open_weather};
use crate::types::history::History;
use crate::types::reading::Reading;
use chrono::{Duration, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// How long a fetched history may be served from memory before it counts as
/// stale. Keeps interactive refreshes from hammering the upstream without
/// ever silently serving old data past the window.
const CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Fetches normalized hourly pollutant histories from the configured provider.
///
/// One outbound request per (uncached) invocation, bounded by a 10 second
/// timeout on the shared HTTP client. Construction fails fast when the
/// selected provider mandates a credential that is not configured; transient
/// per-location failures surface as [`ProviderError`]s that batch callers
/// degrade to "skip this location".
#[derive(Debug)]
pub struct HistoryFetcher {
    kind: ProviderKind,
    api_key: Option<String>,
    client: Client,
    cache: Mutex<HashMap<CacheKey, CacheEntry>>,
}

/// Cache key for one fetch: coordinate bits + lookback hours. Bit-exact
/// coordinates are fine here since keys come from the immutable catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    lat_bits: u64,
    lon_bits: u64,
    lookback_hours: i64,
}

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    history: History,
}

impl HistoryFetcher {
    /// Creates a fetcher for `kind`, reading the provider credential (if the
    /// provider mandates one) from its environment variable.
    pub fn new(kind: ProviderKind) -> Result<HistoryFetcher, ProviderError> {
        let api_key = match kind.api_key_env() {
            Some(env) => std::env::var(env).ok(),
            None => None,
        };
        Self::with_api_key(kind, api_key)
    }

    /// Creates a fetcher with an explicitly supplied credential.
    pub fn with_api_key(
        kind: ProviderKind,
        api_key: Option<String>,
    ) -> Result<HistoryFetcher, ProviderError> {
        if let Some(env) = kind.api_key_env() {
            if api_key.as_deref().map_or(true, str::is_empty) {
                return Err(ProviderError::MissingApiKey {
                    provider: kind,
                    env,
                });
            }
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ProviderError::ClientBuild)?;
        Ok(HistoryFetcher {
            kind,
            api_key,
            client,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Fetches a normalized hourly history covering at most `lookback` of the
    /// past for the given coordinates.
    ///
    /// The window is clamped to what the provider supports. An empty
    /// [`History`] means the provider had no data there; callers should skip
    /// the location rather than treat it as a failure.
    pub async fn fetch(
        &self,
        location: LatLon,
        lookback: Duration,
    ) -> Result<History, ProviderError> {
        let lookback = clamp_lookback(self.kind, lookback);
        let key = CacheKey {
            lat_bits: location.0.to_bits(),
            lon_bits: location.1.to_bits(),
            lookback_hours: lookback.num_hours(),
        };

        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&key) {
                if entry.fetched_at.elapsed() < CACHE_TTL {
                    debug!(
                        "Cache hit for ({}, {}) over {}h",
                        location.0, location.1, key.lookback_hours
                    );
                    return Ok(entry.history.clone());
                }
            }
            // Stale or missing; release the lock before the network call.
        }

        let now = Utc::now();
        let samples = self.request_samples(location, lookback).await?;
        let history = normalize(samples, now);
        if history.is_empty() {
            info!(
                "{} returned no usable data for ({}, {})",
                self.kind, location.0, location.1
            );
        }

        let mut cache = self.cache.lock().await;
        // A concurrent fetch may have inserted meanwhile; either result is
        // fresh enough, so the later write simply wins.
        cache.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                history: history.clone(),
            },
        );
        Ok(history)
    }

    async fn request_samples(
        &self,
        location: LatLon,
        lookback: Duration,
    ) -> Result<Vec<Reading>, ProviderError> {
        let LatLon(lat, lon) = location;
        let end = Utc::now();
        let start = end - lookback;
        let url = match self.kind {
            ProviderKind::OpenWeather => {
                // Key presence is checked at construction.
                let key = self.api_key.as_deref().unwrap_or_default();
                open_weather::url(lat, lon, start, end, key)
            }
            ProviderKind::OpenMeteo => {
                let past_days = (lookback.num_hours() + 23) / 24;
                open_meteo::url(lat, lon, past_days.max(1))
            }
            ProviderKind::OpenAq => open_aq::url(lat, lon, start, end),
        };
        debug!(
            "Requesting {} history for ({}, {}) over {}h",
            self.kind,
            lat,
            lon,
            lookback.num_hours()
        );

        let mut request = self.client.get(&url);
        if self.kind == ProviderKind::OpenAq {
            if let Some(key) = &self.api_key {
                request = request.header("X-API-Key", key);
            }
        }
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::NetworkRequest(self.kind.to_string(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error from {}: {:?}", self.kind, e.status());
                return Err(if let Some(status) = e.status() {
                    ProviderError::HttpStatus {
                        url: self.kind.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ProviderError::NetworkRequest(self.kind.to_string(), e)
                });
            }
        };
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::BodyRead(self.kind.to_string(), e))?;

        match self.kind {
            ProviderKind::OpenWeather => open_weather::parse(&body),
            ProviderKind::OpenMeteo => open_meteo::parse(&body),
            ProviderKind::OpenAq => open_aq::parse(&body),
        }
    }
}

/// Clamps the requested lookback to what the provider supports, with a floor
/// of one hour so "latest reading only" requests stay well-formed.
fn clamp_lookback(kind: ProviderKind, lookback: Duration) -> Duration {
    let lookback = lookback.max(Duration::hours(1));
    match kind.max_lookback() {
        Some(cap) => lookback.min(cap),
        None => lookback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_is_clamped_to_provider_cap() {
        assert_eq!(
            clamp_lookback(ProviderKind::OpenWeather, Duration::days(30)),
            Duration::days(5)
        );
        assert_eq!(
            clamp_lookback(ProviderKind::OpenAq, Duration::days(30)),
            Duration::days(30)
        );
        assert_eq!(
            clamp_lookback(ProviderKind::OpenMeteo, Duration::minutes(5)),
            Duration::hours(1)
        );
    }

    #[test]
    fn keyless_provider_needs_no_credential() {
        assert!(HistoryFetcher::with_api_key(ProviderKind::OpenMeteo, None).is_ok());
    }

    #[test]
    fn keyed_provider_without_credential_is_a_config_error() {
        let err = HistoryFetcher::with_api_key(ProviderKind::OpenWeather, None).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::MissingApiKey {
                provider: ProviderKind::OpenWeather,
                env: "OPENWEATHER_API_KEY"
            }
        ));
        let err = HistoryFetcher::with_api_key(ProviderKind::OpenAq, Some(String::new()))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey { .. }));
    }

    #[test]
    fn cache_keys_distinguish_location_and_window() {
        let a = CacheKey {
            lat_bits: 28.6f64.to_bits(),
            lon_bits: 77.2f64.to_bits(),
            lookback_hours: 24,
        };
        let b = CacheKey {
            lat_bits: 28.6f64.to_bits(),
            lon_bits: 77.2f64.to_bits(),
            lookback_hours: 48,
        };
        assert_ne!(a, b);
        assert_eq!(
            a,
            CacheKey {
                lat_bits: 28.6f64.to_bits(),
                lon_bits: 77.2f64.to_bits(),
                lookback_hours: 24,
            }
        );
    }
}
