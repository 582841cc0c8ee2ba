use crate::sanitize::sanitize;
use crate::types::category::AqiCategory;
use chrono::{DateTime, Utc};

/// A point-in-time set of pollutant measurements for one location.
///
/// Fields are `Option` because upstream providers routinely omit individual
/// pollutants; values are only sanitized at the presentation boundary
/// (see [`Snapshot`]), so a missing measurement stays distinguishable from a
/// measured zero inside a [`crate::History`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub datetime: DateTime<Utc>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub co: Option<f64>,
}

impl Reading {
    /// An all-missing reading at `datetime`.
    pub fn empty(datetime: DateTime<Utc>) -> Reading {
        Reading {
            datetime,
            pm2_5: None,
            pm10: None,
            no2: None,
            o3: None,
            so2: None,
            co: None,
        }
    }
}

/// The latest reading of a history, sanitized and annotated with its category.
///
/// Derived, never persisted: computed per fetch, held for one report row or
/// one dashboard render, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub datetime: DateTime<Utc>,
    pub pm2_5: f64,
    pub pm10: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub co: f64,
    pub category: AqiCategory,
}

impl Snapshot {
    /// Sanitizes all fields of `reading` and derives the category from PM2.5.
    pub fn from_reading(reading: &Reading) -> Snapshot {
        let pm2_5 = sanitize(reading.pm2_5);
        Snapshot {
            datetime: reading.datetime,
            pm2_5,
            pm10: sanitize(reading.pm10),
            no2: sanitize(reading.no2),
            o3: sanitize(reading.o3),
            so2: sanitize(reading.so2),
            co: sanitize(reading.co),
            category: AqiCategory::from_pm25(pm2_5),
        }
    }
}
