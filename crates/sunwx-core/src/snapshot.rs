//! Composition of the snapshot handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::solar::{reconcile, SolarSnapshot, SolarSources};
use crate::types::RawPayloads;
use crate::weather::{normalize_weather, WeatherSettings, WeatherSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub weather: Option<WeatherSnapshot>,
    pub solar: Option<SolarSnapshot>,
    pub last_updated: DateTime<Utc>,
}

/// Build the snapshot for one run. `captured_at` is stamped on every part.
pub fn compose(
    raw: &RawPayloads,
    weather: &WeatherSettings,
    captured_at: DateTime<Utc>,
) -> Snapshot {
    let solar = raw
        .gateway
        .as_ref()
        .map(|gateway| reconcile(&SolarSources::from(gateway), captured_at));

    Snapshot {
        weather: normalize_weather(raw.weather.as_ref(), weather, captured_at),
        solar,
        last_updated: captured_at,
    }
}
