//! HTTP transport shared by the fetchers

use std::time::Duration;

use reqwest::{header::ACCEPT, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::{ParseError, Url};

use crate::{FetchError, FetchResult};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one upstream's HTTP client.
///
/// Each fetcher builds its own client from this, so relaxed certificate
/// trust for the gateway never applies to other hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl TransportConfig {
    pub fn strict(timeout: Duration) -> Self {
        Self {
            timeout,
            accept_invalid_certs: false,
        }
    }

    /// For a local device presenting a self-signed certificate
    pub fn self_signed(timeout: Duration) -> Self {
        Self {
            timeout,
            accept_invalid_certs: true,
        }
    }

    pub fn build_client(&self) -> FetchResult<Client> {
        Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(FetchError::Client)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::strict(DEFAULT_FETCH_TIMEOUT)
    }
}

/// Append a resource path to the configured base, keeping any path prefix
pub(crate) fn endpoint(base: &Url, path: &str) -> FetchResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

/// Send a GET and decode a JSON body
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> FetchResult<T> {
    let response = request
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(FetchError::transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(FetchError::transport)?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_and_weather_trust_differ() {
        let gateway = TransportConfig::self_signed(Duration::from_secs(3));
        let weather = TransportConfig::strict(Duration::from_secs(3));

        assert!(gateway.accept_invalid_certs);
        assert!(!weather.accept_invalid_certs);
        assert!(gateway.build_client().is_ok());
        assert!(weather.build_client().is_ok());
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let bare = Url::parse("https://envoy.local").unwrap();
        let prefixed = Url::parse("https://proxy.lan/envoy").unwrap();
        let slashed = Url::parse("https://proxy.lan/envoy/").unwrap();

        assert_eq!(
            endpoint(&bare, "/production.json").unwrap().as_str(),
            "https://envoy.local/production.json"
        );
        assert_eq!(
            endpoint(&prefixed, "/ivp/pdm/energy").unwrap().as_str(),
            "https://proxy.lan/envoy/ivp/pdm/energy"
        );
        assert_eq!(
            endpoint(&slashed, "/production.json").unwrap().as_str(),
            "https://proxy.lan/envoy/production.json"
        );
    }

    #[test]
    fn test_endpoint_rejects_opaque_base() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        assert!(matches!(
            endpoint(&base, "/production.json"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_default_is_strict() {
        let config = TransportConfig::default();
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.timeout, DEFAULT_FETCH_TIMEOUT);
    }
}
