use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use sunwx_core::{UnitSystem, DEFAULT_TEMPERATURE};

pub const DEFAULT_GATEWAY_URL: &str = "https://envoy.local";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    /// The gateway ships a self-signed certificate; defaults to true
    pub accept_invalid_certs: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub units: Option<UnitSystem>,
    pub default_temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load from the SUNWX_CONFIG path (TOML) if present, then apply
    /// environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SUNWX_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Read a TOML file; a missing file yields the defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&s)?)
    }

    /// Overlay values from an environment-like lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ENVOY_URL") {
            self.gateway.base_url = Some(url);
        }
        if let Some(token) = lookup("ENVOY_TOKEN") {
            self.gateway.token = Some(token);
        }
        if let Some(secs) = lookup("ENVOY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = Some(parse_env("ENVOY_TIMEOUT_SECS", secs)?);
        }
        if let Some(key) = lookup("OPENWEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(lat) = lookup("WEATHER_LAT") {
            self.weather.lat = Some(parse_env("WEATHER_LAT", lat)?);
        }
        if let Some(lon) = lookup("WEATHER_LON") {
            self.weather.lon = Some(parse_env("WEATHER_LON", lon)?);
        }
        if let Some(units) = lookup("WEATHER_UNITS") {
            self.weather.units = Some(parse_env("WEATHER_UNITS", units)?);
        }
        if let Some(bind) = lookup("SUNWX_BIND") {
            self.server.bind = Some(bind);
        }
        Ok(())
    }

    pub fn gateway_url(&self) -> &str {
        non_empty(self.gateway.base_url.as_ref()).unwrap_or(DEFAULT_GATEWAY_URL)
    }

    /// Bearer token; without one no gateway call is attempted
    pub fn gateway_token(&self) -> Option<&str> {
        non_empty(self.gateway.token.as_ref())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn accept_invalid_certs(&self) -> bool {
        self.gateway.accept_invalid_certs.unwrap_or(true)
    }

    pub fn weather_url(&self) -> &str {
        non_empty(self.weather.base_url.as_ref()).unwrap_or(DEFAULT_WEATHER_URL)
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        non_empty(self.weather.api_key.as_ref())
    }

    /// (lat, lon), only when both are set and finite
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.weather.lat, self.weather.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn units(&self) -> UnitSystem {
        self.weather.units.unwrap_or_default()
    }

    pub fn default_temperature(&self) -> f64 {
        self.weather
            .default_temperature
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Get HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.server
            .bind
            .clone()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.http_bind(), "0.0.0.0:8080");
        assert_eq!(cfg.gateway_url(), "https://envoy.local");
        assert_eq!(cfg.units(), UnitSystem::Imperial);
        assert_eq!(cfg.default_temperature(), 37.0);
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(10));
        assert!(cfg.accept_invalid_certs());
        assert!(cfg.gateway_token().is_none());
        assert!(cfg.weather_api_key().is_none());
        assert!(cfg.coordinates().is_none());
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[gateway]
base_url = "https://192.168.1.50"
token = "abc"
timeout_secs = 4

[weather]
api_key = "k"
lat = 45.5
lon = -122.6
units = "metric"

[server]
bind = "127.0.0.1:9000"
"#
        )
        .unwrap();

        let cfg = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(cfg.gateway_url(), "https://192.168.1.50");
        assert_eq!(cfg.gateway_token(), Some("abc"));
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(4));
        assert_eq!(cfg.coordinates(), Some((45.5, -122.6)));
        assert_eq!(cfg.units(), UnitSystem::Metric);
        assert_eq!(cfg.http_bind(), "127.0.0.1:9000");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert!(cfg.gateway_token().is_none());
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[weather]\nunits = \"kelvin\"").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.gateway.token = Some("from-file".into());

        cfg.apply_env(env(&[
            ("ENVOY_TOKEN", "from-env"),
            ("OPENWEATHER_API_KEY", "key"),
            ("WEATHER_LAT", "51.5"),
            ("WEATHER_LON", "-0.12"),
            ("WEATHER_UNITS", "metric"),
        ]))
        .unwrap();

        assert_eq!(cfg.gateway_token(), Some("from-env"));
        assert_eq!(cfg.weather_api_key(), Some("key"));
        assert_eq!(cfg.coordinates(), Some((51.5, -0.12)));
        assert_eq!(cfg.units(), UnitSystem::Metric);
    }

    #[test]
    fn blank_credentials_are_absent() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("ENVOY_TOKEN", "  "), ("OPENWEATHER_API_KEY", "")]))
            .unwrap();

        assert!(cfg.gateway_token().is_none());
        assert!(cfg.weather_api_key().is_none());
    }

    #[test]
    fn bad_env_value_is_reported() {
        let mut cfg = AppConfig::default();
        let err = cfg.apply_env(env(&[("WEATHER_LAT", "north")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WEATHER_LAT", .. }));
    }
}
