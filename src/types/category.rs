//! The fixed six-tier air quality category scale derived from PM2.5.
//!
//! The classification thresholds follow the Indian national AQI breakpoints
//! for PM2.5 concentration (µg/m³), with inclusive upper bounds. The color
//! and health recommendation tables are keyed off the same scale, so a
//! threshold change here changes all three consistently.

use std::fmt;

/// An air quality severity category, derived from a PM2.5 concentration.
///
/// `Unknown` marks readings that could not be classified (negative or NaN
/// sentinel values); it never comes from a real measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
    Unknown,
}

impl AqiCategory {
    /// Classifies a PM2.5 concentration (µg/m³) into a category.
    ///
    /// Bounds are inclusive: 30.0 is still `Good`, 30.0001 is `Satisfactory`.
    /// Negative or NaN input classifies as `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use aqimon::AqiCategory;
    ///
    /// assert_eq!(AqiCategory::from_pm25(12.0), AqiCategory::Good);
    /// assert_eq!(AqiCategory::from_pm25(300.0), AqiCategory::Severe);
    /// assert_eq!(AqiCategory::from_pm25(-1.0), AqiCategory::Unknown);
    /// ```
    pub fn from_pm25(pm25: f64) -> AqiCategory {
        if pm25.is_nan() || pm25 < 0.0 {
            AqiCategory::Unknown
        } else if pm25 <= 30.0 {
            AqiCategory::Good
        } else if pm25 <= 60.0 {
            AqiCategory::Satisfactory
        } else if pm25 <= 90.0 {
            AqiCategory::Moderate
        } else if pm25 <= 120.0 {
            AqiCategory::Poor
        } else if pm25 <= 250.0 {
            AqiCategory::VeryPoor
        } else {
            AqiCategory::Severe
        }
    }

    /// The display color (hex) for this category. Total over all seven variants.
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00B050",
            AqiCategory::Satisfactory => "#92D050",
            AqiCategory::Moderate => "#FFFF00",
            AqiCategory::Poor => "#FF9900",
            AqiCategory::VeryPoor => "#FF0000",
            AqiCategory::Severe => "#C00000",
            AqiCategory::Unknown => "#808080",
        }
    }

    /// Actionable health guidance for this category.
    pub fn recommendation(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is good. Enjoy your outdoor activities!",
            AqiCategory::Satisfactory => {
                "Air quality is acceptable. Sensitive groups should consider reducing heavy exertion."
            }
            AqiCategory::Moderate => {
                "Members of sensitive groups may experience health effects. The general public is not likely to be affected."
            }
            AqiCategory::Poor => {
                "Everyone may begin to experience health effects; members of sensitive groups may experience more serious health effects."
            }
            AqiCategory::VeryPoor => {
                "Health warnings of emergency conditions. The entire population is more likely to be affected."
            }
            AqiCategory::Severe => {
                "Health alert: everyone may experience more serious health effects. Avoid all outdoor exertion."
            }
            AqiCategory::Unknown => "No data available.",
        }
    }

    /// The display label, as written into reports (`"Very Poor"`, not `"VeryPoor"`).
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
            AqiCategory::Unknown => "Unknown",
        }
    }

    /// Parses a display label back into a category (used when reading reports back).
    pub fn from_label(label: &str) -> Option<AqiCategory> {
        match label {
            "Good" => Some(AqiCategory::Good),
            "Satisfactory" => Some(AqiCategory::Satisfactory),
            "Moderate" => Some(AqiCategory::Moderate),
            "Poor" => Some(AqiCategory::Poor),
            "Very Poor" => Some(AqiCategory::VeryPoor),
            "Severe" => Some(AqiCategory::Severe),
            "Unknown" => Some(AqiCategory::Unknown),
            _ => None,
        }
    }

    /// All seven variants, in increasing severity order (`Unknown` last).
    pub fn all() -> [AqiCategory; 7] {
        [
            AqiCategory::Good,
            AqiCategory::Satisfactory,
            AqiCategory::Moderate,
            AqiCategory::Poor,
            AqiCategory::VeryPoor,
            AqiCategory::Severe,
            AqiCategory::Unknown,
        ]
    }

    fn severity_rank(&self) -> u8 {
        match self {
            AqiCategory::Good => 0,
            AqiCategory::Satisfactory => 1,
            AqiCategory::Moderate => 2,
            AqiCategory::Poor => 3,
            AqiCategory::VeryPoor => 4,
            AqiCategory::Severe => 5,
            AqiCategory::Unknown => 6,
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Health guidance keyed directly by a PM2.5 value.
///
/// Uses the same thresholds as [`AqiCategory::from_pm25`] by construction:
/// the value is classified first, then mapped through the category table.
pub fn health_recommendation(pm25: f64) -> &'static str {
    AqiCategory::from_pm25(pm25).recommendation()
}
