//! Adapter for the Open-Meteo air quality API.
//!
//! Endpoint: `GET air-quality-api.open-meteo.com/v1/air-quality` with an
//! `hourly=` column list. The response carries parallel arrays under
//! `hourly`, with provider-specific pollutant names (`nitrogen_dioxide`,
//! `carbon_monoxide`, ...) that are renamed to the fixed column set here.
//! Open-Meteo always appends forecast hours beyond "now"; dropping those is
//! the normalization pipeline's job, not this adapter's.

use crate::providers::error::ProviderError;
use crate::providers::kind::ProviderKind;
use crate::types::reading::Reading;
use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Payload {
    hourly: Option<Hourly>,
}

#[derive(Debug, Default, Deserialize)]
struct Hourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    pm2_5: Vec<Option<f64>>,
    #[serde(default)]
    pm10: Vec<Option<f64>>,
    #[serde(default)]
    nitrogen_dioxide: Vec<Option<f64>>,
    #[serde(default)]
    ozone: Vec<Option<f64>>,
    #[serde(default)]
    sulphur_dioxide: Vec<Option<f64>>,
    #[serde(default)]
    carbon_monoxide: Vec<Option<f64>>,
}

pub(crate) fn url(lat: f64, lon: f64, past_days: i64) -> String {
    format!(
        "https://air-quality-api.open-meteo.com/v1/air-quality?latitude={}&longitude={}\
         &hourly=pm2_5,pm10,nitrogen_dioxide,ozone,sulphur_dioxide,carbon_monoxide\
         &past_days={}&timezone=UTC",
        lat, lon, past_days
    )
}

pub(crate) fn parse(body: &str) -> Result<Vec<Reading>, ProviderError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| ProviderError::PayloadParse {
            provider: ProviderKind::OpenMeteo,
            source: e,
        })?;
    let hourly = payload.hourly.unwrap_or_default();

    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();
    let samples = hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, time)| {
            // Timestamps come as "2024-11-04T06:00" in UTC (timezone=UTC requested).
            let datetime = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
                .ok()?
                .and_utc();
            Some(Reading {
                datetime,
                pm2_5: at(&hourly.pm2_5, i),
                pm10: at(&hourly.pm10, i),
                no2: at(&hourly.nitrogen_dioxide, i),
                o3: at(&hourly.ozone, i),
                so2: at(&hourly.sulphur_dioxide, i),
                co: at(&hourly.carbon_monoxide, i),
            })
        })
        .collect();
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn renames_provider_columns() {
        let body = r#"{
            "latitude": 28.6, "longitude": 77.2,
            "hourly": {
                "time": ["2024-11-04T06:00", "2024-11-04T07:00"],
                "pm2_5": [80.1, 82.5],
                "pm10": [120.0, null],
                "nitrogen_dioxide": [25.0, 26.0],
                "ozone": [12.0, 14.0],
                "sulphur_dioxide": [6.0, 6.5],
                "carbon_monoxide": [900.0, 910.0]
            }
        }"#;
        let samples = parse(body).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0].datetime,
            Utc.with_ymd_and_hms(2024, 11, 4, 6, 0, 0).unwrap()
        );
        assert_eq!(samples[0].no2, Some(25.0));
        assert_eq!(samples[0].co, Some(900.0));
        assert_eq!(samples[1].pm10, None);
    }

    #[test]
    fn missing_hourly_block_is_no_data() {
        let samples = parse(r#"{"latitude": 28.6, "longitude": 77.2}"#).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn ragged_columns_read_as_absent() {
        let body = r#"{"hourly": {"time": ["2024-11-04T06:00"], "pm2_5": []}}"#;
        let samples = parse(body).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].pm2_5, None);
    }

    #[test]
    fn url_requests_the_renamable_columns() {
        let url = url(28.6, 77.2, 2);
        assert!(url.contains("carbon_monoxide"));
        assert!(url.contains("past_days=2"));
        assert!(url.contains("timezone=UTC"));
    }
}
