//! Adapter for the OpenAQ measurements API.
//!
//! Endpoint: `GET api.openaq.org/v2/measurements` with a coordinate + radius
//! query; authentication via the `X-API-Key` header. Each result row holds a
//! single `(parameter, value, date.utc)` measurement, so one raw sample is
//! emitted per row and the normalization pipeline mean-merges rows that fall
//! into the same hour. OpenAQ parameter names (`pm25`, ...) are mapped onto
//! the fixed column set; sentinel values (<= -900) count as absent.

use crate::providers::error::ProviderError;
use crate::providers::kind::ProviderKind;
use crate::types::reading::Reading;
use chrono::{DateTime, Utc};
use serde::Deserialize;

const SEARCH_RADIUS_M: u32 = 25_000;
const PAGE_LIMIT: u32 = 1_000;

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    results: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
struct Measurement {
    parameter: String,
    value: f64,
    date: MeasurementDate,
}

#[derive(Debug, Deserialize)]
struct MeasurementDate {
    utc: DateTime<Utc>,
}

pub(crate) fn url(lat: f64, lon: f64, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "https://api.openaq.org/v2/measurements?coordinates={},{}&radius={}\
         &date_from={}&date_to={}&limit={}\
         &parameter=pm25&parameter=pm10&parameter=no2&parameter=o3&parameter=so2&parameter=co",
        lat,
        lon,
        SEARCH_RADIUS_M,
        start.to_rfc3339(),
        end.to_rfc3339(),
        PAGE_LIMIT
    )
}

pub(crate) fn parse(body: &str) -> Result<Vec<Reading>, ProviderError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| ProviderError::PayloadParse {
            provider: ProviderKind::OpenAq,
            source: e,
        })?;

    let samples = payload
        .results
        .into_iter()
        .filter(|m| m.value > -900.0)
        .filter_map(|m| {
            let mut reading = Reading::empty(m.date.utc);
            let slot = match m.parameter.as_str() {
                "pm25" => &mut reading.pm2_5,
                "pm10" => &mut reading.pm10,
                "no2" => &mut reading.no2,
                "o3" => &mut reading.o3,
                "so2" => &mut reading.so2,
                "co" => &mut reading.co,
                _ => return None,
            };
            *slot = Some(m.value);
            Some(reading)
        })
        .collect();
    Ok(samples)
}
