//! One reconciliation run: capture time, fetch everything, compose

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use sunwx_config::AppConfig;
use sunwx_core::{compose, Snapshot, WeatherSettings};
use sunwx_ingest::{
    Collector, Coordinates, EnvoyClient, OpenWeatherClient, TransportConfig, Upstream,
};
use tracing::info;

pub struct Dashboard {
    collector: Collector,
    weather: WeatherSettings,
}

/// Result of a run, plus which configured upstreams failed
pub struct Run {
    pub snapshot: Snapshot,
    pub unavailable: Vec<Upstream>,
}

impl Dashboard {
    pub fn new(collector: Collector, weather: WeatherSettings) -> Self {
        Self { collector, weather }
    }

    /// Wire upstream clients from configuration. Sources lacking
    /// credentials are left out and their sub-snapshot is omitted.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let timeout = cfg.fetch_timeout();
        let mut collector = Collector::new(timeout);

        match cfg.gateway_token() {
            Some(token) => {
                let transport = TransportConfig {
                    timeout,
                    accept_invalid_certs: cfg.accept_invalid_certs(),
                };
                let envoy = EnvoyClient::new(cfg.gateway_url(), token, transport)
                    .context("Invalid gateway configuration")?;
                info!(url = %envoy.base_url(), "gateway source configured");
                collector = collector.with_gateway(Arc::new(envoy));
            }
            None => info!("no gateway token configured; solar snapshot disabled"),
        }

        match (cfg.weather_api_key(), cfg.coordinates()) {
            (Some(api_key), Some((lat, lon))) => {
                let weather = OpenWeatherClient::new(
                    cfg.weather_url(),
                    api_key,
                    Coordinates { lat, lon },
                    cfg.units(),
                    TransportConfig::strict(timeout),
                )
                .context("Invalid weather configuration")?;
                info!(units = %cfg.units(), "weather source configured");
                collector = collector.with_weather(Arc::new(weather));
            }
            _ => info!("weather API key or coordinates missing; weather snapshot disabled"),
        }

        Ok(Self::new(
            collector,
            WeatherSettings {
                units: cfg.units(),
                default_temperature: cfg.default_temperature(),
            },
        ))
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub async fn run(&self) -> Run {
        let captured_at = Utc::now();
        let raw = self.collector.collect().await;
        let unavailable = self.collector.unavailable(&raw);
        let snapshot = compose(&raw, &self.weather, captured_at);

        info!(
            solar = snapshot.solar.is_some(),
            weather = snapshot.weather.is_some(),
            unavailable = unavailable.len(),
            "snapshot composed"
        );
        Run {
            snapshot,
            unavailable,
        }
    }
}
