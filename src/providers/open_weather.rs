//! Adapter for the OpenWeather air pollution history API.
//!
//! Endpoint: `GET /data/2.5/air_pollution/history?lat&lon&start&end&appid`.
//! Samples arrive as epoch-second entries under `list[].components`, already
//! using this crate's pollutant names. A payload without a `list` field (the
//! API's way of reporting "nothing here") parses to zero samples.

use crate::providers::error::ProviderError;
use crate::providers::kind::ProviderKind;
use crate::sanitize::json_number;
use crate::types::reading::Reading;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    list: Vec<Sample>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    dt: i64,
    #[serde(default)]
    components: HashMap<String, Value>,
}

pub(crate) fn url(lat: f64, lon: f64, start: DateTime<Utc>, end: DateTime<Utc>, api_key: &str) -> String {
    format!(
        "https://api.openweathermap.org/data/2.5/air_pollution/history?lat={}&lon={}&start={}&end={}&appid={}",
        lat,
        lon,
        start.timestamp(),
        end.timestamp(),
        api_key
    )
}

pub(crate) fn parse(body: &str) -> Result<Vec<Reading>, ProviderError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| ProviderError::PayloadParse {
            provider: ProviderKind::OpenWeather,
            source: e,
        })?;

    let samples = payload
        .list
        .into_iter()
        .filter_map(|sample| {
            let datetime = DateTime::from_timestamp(sample.dt, 0)?;
            let component = |name: &str| sample.components.get(name).and_then(json_number);
            Some(Reading {
                datetime,
                pm2_5: component("pm2_5"),
                pm10: component("pm10"),
                no2: component("no2"),
                o3: component("o3"),
                so2: component("so2"),
                co: component("co"),
            })
        })
        .collect();
    Ok(samples)
}
