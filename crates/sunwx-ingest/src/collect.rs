//! Concurrent collection of every upstream payload for one run

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sunwx_core::{GatewayPayloads, RawPayloads};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::transport::DEFAULT_FETCH_TIMEOUT;
use crate::{FetchError, FetchResult, GatewaySource, WeatherSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Production,
    Inverters,
    LiveStatus,
    DailyEnergy,
    Weather,
}

impl Upstream {
    pub fn name(self) -> &'static str {
        match self {
            Upstream::Production => "production",
            Upstream::Inverters => "inverters",
            Upstream::LiveStatus => "livedata",
            Upstream::DailyEnergy => "pdm_energy",
            Upstream::Weather => "weather",
        }
    }
}

/// Fans out to every configured upstream and joins on all of them.
///
/// An unconfigured source is never called. Fetches run on the caller's task,
/// so dropping the `collect` future cancels whatever is still in flight.
pub struct Collector {
    gateway: Option<Arc<dyn GatewaySource>>,
    weather: Option<Arc<dyn WeatherSource>>,
    timeout: Duration,
}

impl Collector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            gateway: None,
            weather: None,
            timeout,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn GatewaySource>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherSource>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn has_weather(&self) -> bool {
        self.weather.is_some()
    }

    pub async fn collect(&self) -> RawPayloads {
        let gateway = self.gateway.as_deref();
        let weather = self.weather.as_deref();

        let (summary, inverters, live, energy, weather) = tokio::join!(
            self.settle(Upstream::Production, gateway.map(|g| g.production())),
            self.settle(Upstream::Inverters, gateway.map(|g| g.inverters())),
            self.settle(Upstream::LiveStatus, gateway.map(|g| g.live_status())),
            self.settle(Upstream::DailyEnergy, gateway.map(|g| g.daily_energy())),
            self.settle(Upstream::Weather, weather.map(|w| w.current())),
        );

        RawPayloads {
            gateway: gateway.map(|_| GatewayPayloads {
                summary,
                inverters,
                live,
                energy,
            }),
            weather,
        }
    }

    /// Configured upstreams that came back unavailable
    pub fn unavailable(&self, payloads: &RawPayloads) -> Vec<Upstream> {
        let mut missing = Vec::new();
        if let Some(gateway) = payloads.gateway.as_ref() {
            let slots = [
                (Upstream::Production, gateway.summary.is_none()),
                (Upstream::Inverters, gateway.inverters.is_none()),
                (Upstream::LiveStatus, gateway.live.is_none()),
                (Upstream::DailyEnergy, gateway.energy.is_none()),
            ];
            missing.extend(slots.into_iter().filter(|(_, gone)| *gone).map(|(u, _)| u));
        }
        if self.has_weather() && payloads.weather.is_none() {
            missing.push(Upstream::Weather);
        }
        missing
    }

    async fn settle<T, F>(&self, upstream: Upstream, fetch: Option<F>) -> Option<T>
    where
        F: Future<Output = FetchResult<T>>,
    {
        let fetch = fetch?;
        let result = match timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        };
        match result {
            Ok(payload) => {
                debug!(source = upstream.name(), "upstream payload received");
                Some(payload)
            }
            Err(error) => {
                warn!(source = upstream.name(), %error, "upstream unavailable");
                None
            }
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}
