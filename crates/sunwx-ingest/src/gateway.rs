//! Enphase Envoy gateway client

use reqwest::Client;
use serde::de::DeserializeOwned;
use sunwx_core::{RawDailyEnergy, RawInverter, RawLiveMeterStatus, RawProductionSummary};
use tracing::debug;
use url::Url;

use crate::transport::{endpoint, get_json, TransportConfig};
use crate::{FetchResult, GatewaySource};

const PRODUCTION_PATH: &str = "/production.json";
const INVERTERS_PATH: &str = "/api/v1/production/inverters";
const LIVE_STATUS_PATH: &str = "/ivp/livedata/status";
const DAILY_ENERGY_PATH: &str = "/ivp/pdm/energy";

/// Bearer-authenticated client for the local gateway
#[derive(Clone)]
pub struct EnvoyClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl EnvoyClient {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        transport: TransportConfig,
    ) -> FetchResult<Self> {
        Ok(Self {
            client: transport.build_client()?,
            base_url: Url::parse(base_url.trim())?,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> FetchResult<T> {
        let url = endpoint(&self.base_url, path)?;
        debug!(%url, "fetching gateway resource");
        get_json(self.client.get(url).bearer_auth(&self.token)).await
    }
}

#[async_trait::async_trait]
impl GatewaySource for EnvoyClient {
    async fn production(&self) -> FetchResult<RawProductionSummary> {
        self.get(PRODUCTION_PATH).await
    }

    async fn inverters(&self) -> FetchResult<Vec<RawInverter>> {
        self.get(INVERTERS_PATH).await
    }

    async fn live_status(&self) -> FetchResult<RawLiveMeterStatus> {
        self.get(LIVE_STATUS_PATH).await
    }

    async fn daily_energy(&self) -> FetchResult<RawDailyEnergy> {
        self.get(DAILY_ENERGY_PATH).await
    }
}
