//! Upstream fetchers for the energy gateway and the weather service
//!
//! Each upstream resource is fetched independently. A failed fetch is logged
//! and becomes "unavailable"; it never aborts the run.

pub mod collect;
pub mod gateway;
pub mod transport;
pub mod weather;

pub use collect::*;
pub use gateway::*;
pub use transport::*;
pub use weather::*;

use sunwx_core::{RawDailyEnergy, RawInverter, RawLiveMeterStatus, RawProductionSummary, RawWeather};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Upstream unreachable: {0}")]
    Unreachable(reqwest::Error),

    #[error("Timeout waiting for upstream")]
    Timeout,

    #[error("Upstream returned status {status}")]
    Status { status: u16 },

    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client setup failed: {0}")]
    Client(reqwest::Error),
}

impl FetchError {
    pub(crate) fn transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Unreachable(error)
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// The four gateway resources
#[async_trait::async_trait]
pub trait GatewaySource: Send + Sync {
    async fn production(&self) -> FetchResult<RawProductionSummary>;

    async fn inverters(&self) -> FetchResult<Vec<RawInverter>>;

    async fn live_status(&self) -> FetchResult<RawLiveMeterStatus>;

    async fn daily_energy(&self) -> FetchResult<RawDailyEnergy>;
}

/// Current conditions from a weather service
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self) -> FetchResult<RawWeather>;
}
