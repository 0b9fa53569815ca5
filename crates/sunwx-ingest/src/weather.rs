//! OpenWeatherMap current-conditions client

use reqwest::Client;
use sunwx_core::{RawWeather, UnitSystem};
use tracing::debug;
use url::Url;

use crate::transport::{endpoint, get_json, TransportConfig};
use crate::{FetchResult, WeatherSource};

const CURRENT_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: Url,
    api_key: String,
    coordinates: Coordinates,
    units: UnitSystem,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        coordinates: Coordinates,
        units: UnitSystem,
        transport: TransportConfig,
    ) -> FetchResult<Self> {
        Ok(Self {
            client: transport.build_client()?,
            base_url: Url::parse(base_url.trim())?,
            api_key: api_key.into(),
            coordinates,
            units,
        })
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self) -> FetchResult<RawWeather> {
        let url = endpoint(&self.base_url, CURRENT_PATH)?;
        // The query carries the API key; only the bare URL is logged.
        debug!(%url, units = %self.units, "fetching current weather");

        let query = [
            ("lat", self.coordinates.lat.to_string()),
            ("lon", self.coordinates.lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", self.units.as_str().to_string()),
        ];
        get_json(self.client.get(url).query(&query)).await
    }
}
