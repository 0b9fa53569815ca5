//! Normalization of current weather conditions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::{coerce_number, coerce_string};
use crate::types::RawWeather;
use crate::units::{wind_speed, UnitSystem};

pub const DEFAULT_TEMPERATURE: f64 = 37.0;
pub const DEFAULT_DESCRIPTION: &str = "Current conditions";
pub const DEFAULT_ICON: &str = "01d";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSettings {
    pub units: UnitSystem,
    pub default_temperature: f64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            units: UnitSystem::Imperial,
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature: f64,
    /// Millimetres over the last hour
    pub rain: f64,
    /// Cloud cover, percent
    pub clouds: f64,
    pub wind: f64,
    pub description: String,
    pub icon: String,
    pub last_updated: DateTime<Utc>,
}

/// Map a raw payload into display fields.
///
/// Returns `None` only when there is no payload at all; every field of a
/// present payload falls back to a constant.
pub fn normalize_weather(
    raw: Option<&RawWeather>,
    settings: &WeatherSettings,
    captured_at: DateTime<Utc>,
) -> Option<WeatherSnapshot> {
    let raw = raw?;
    let condition = raw.weather.first();

    let reported_wind = coerce_number(raw.wind.as_ref().and_then(|w| w.speed.as_ref()), 0.0);

    Some(WeatherSnapshot {
        temperature: coerce_number(
            raw.main.as_ref().and_then(|m| m.temp.as_ref()),
            settings.default_temperature,
        ),
        rain: coerce_number(raw.rain.as_ref().and_then(|r| r.one_hour.as_ref()), 0.0),
        clouds: coerce_number(raw.clouds.as_ref().and_then(|c| c.all.as_ref()), 0.0),
        wind: wind_speed(reported_wind, settings.units),
        description: coerce_string(
            condition.and_then(|c| c.description.as_ref()),
            DEFAULT_DESCRIPTION,
        ),
        icon: coerce_string(condition.and_then(|c| c.icon.as_ref()), DEFAULT_ICON),
        last_updated: captured_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn captured() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_payload() {
        let raw: RawWeather = serde_json::from_str(
            r#"{
                "main": {"temp": 71.6, "humidity": 40},
                "rain": {"1h": 0.25},
                "clouds": {"all": 75},
                "wind": {"speed": 8.06, "deg": 220},
                "weather": [
                    {"id": 500, "description": "light rain", "icon": "10d"},
                    {"id": 701, "description": "mist", "icon": "50d"}
                ],
                "dt": 1700000000
            }"#,
        )
        .unwrap();

        let snapshot = normalize_weather(Some(&raw), &WeatherSettings::default(), captured())
            .unwrap();

        assert_eq!(snapshot.temperature, 71.6);
        assert_eq!(snapshot.rain, 0.25);
        assert_eq!(snapshot.clouds, 75.0);
        assert_eq!(snapshot.wind, 8.1);
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.icon, "10d");
        assert_eq!(snapshot.last_updated, captured());
    }

    #[test]
    fn test_metric_wind_is_converted() {
        let raw: RawWeather = serde_json::from_str(r#"{"wind": {"speed": 10}}"#).unwrap();
        let settings = WeatherSettings {
            units: UnitSystem::Metric,
            ..WeatherSettings::default()
        };

        let snapshot = normalize_weather(Some(&raw), &settings, captured()).unwrap();
        assert_eq!(snapshot.wind, 22.4);
    }

    #[test]
    fn test_empty_payload_uses_fallbacks() {
        let snapshot =
            normalize_weather(Some(&RawWeather::default()), &WeatherSettings::default(), captured())
                .unwrap();

        assert_eq!(snapshot.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(snapshot.rain, 0.0);
        assert_eq!(snapshot.clouds, 0.0);
        assert_eq!(snapshot.wind, 0.0);
        assert_eq!(snapshot.description, DEFAULT_DESCRIPTION);
        assert_eq!(snapshot.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_blank_condition_strings_fall_back() {
        let raw: RawWeather = serde_json::from_str(
            r#"{"main": {"temp": "not a number"}, "weather": [{"description": "  ", "icon": ""}]}"#,
        )
        .unwrap();
        let settings = WeatherSettings {
            default_temperature: 20.0,
            ..WeatherSettings::default()
        };

        let snapshot = normalize_weather(Some(&raw), &settings, captured()).unwrap();
        assert_eq!(snapshot.temperature, 20.0);
        assert_eq!(snapshot.description, DEFAULT_DESCRIPTION);
        assert_eq!(snapshot.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_unavailable_payload_is_omitted() {
        assert!(normalize_weather(None, &WeatherSettings::default(), captured()).is_none());
    }
}
