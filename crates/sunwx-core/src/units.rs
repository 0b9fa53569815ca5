//! Unit systems and conversions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit conversion error
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown unit system: {0}")]
    UnknownUnitSystem(String),
}

/// Measurement system requested from the weather service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
            UnitSystem::Standard => "standard",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" => Ok(UnitSystem::Imperial),
            "metric" => Ok(UnitSystem::Metric),
            "standard" => Ok(UnitSystem::Standard),
            _ => Err(UnitError::UnknownUnitSystem(s.to_string())),
        }
    }
}

pub const MPS_TO_MPH: f64 = 2.23694;
pub const MILLIWATTS_PER_KILOWATT: f64 = 1_000_000.0;
pub const WATTS_PER_KILOWATT: f64 = 1000.0;

pub fn milliwatts_to_kw(milliwatts: f64) -> f64 {
    milliwatts / MILLIWATTS_PER_KILOWATT
}

pub fn watts_to_kw(watts: f64) -> f64 {
    watts / WATTS_PER_KILOWATT
}

pub fn wh_to_kwh(watt_hours: f64) -> f64 {
    watt_hours / WATTS_PER_KILOWATT
}

/// Wind speed for display, in mph.
///
/// Imperial responses already carry mph; metric and standard carry m/s.
pub fn wind_speed(reported: f64, units: UnitSystem) -> f64 {
    let mph = match units {
        UnitSystem::Imperial => reported,
        UnitSystem::Metric | UnitSystem::Standard => reported * MPS_TO_MPH,
    };
    round_to_tenth(mph)
}

/// Round to one decimal place; non-finite values pass through
pub fn round_to_tenth(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10.0).round() / 10.0
    } else {
        value
    }
}
