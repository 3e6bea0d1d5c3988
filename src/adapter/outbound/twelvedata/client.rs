//! Twelve Data HTTP client.
//!
//! Implements [`OriginClient`] over the `time_series` endpoint with a daily
//! interval. The client itself does not throttle; it is always called
//! through the rate-limited pool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use super::dto::TimeSeriesResponse;
use crate::domain::{RequestContext, SymbolKey};
use crate::error::{ConfigError, Error, OriginError, Result};
use crate::port::{OriginClient, TimeSeries};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

const TIME_SERIES_PATH: &str = "time_series";
const DAILY_INTERVAL: &str = "1day";

/// Twelve Data API client.
#[derive(Debug, Clone)]
pub struct TwelveData {
    client: Client,
    api_key: String,
    base: Url,
}

impl TwelveData {
    /// Create a client for `host` (e.g. `https://api.twelvedata.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an absolute http(s) URL or the HTTP
    /// client cannot be built.
    pub fn new(api_key: impl Into<String>, host: &str, timeout: Duration) -> Result<Self> {
        let base = parse_host(host)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base,
        })
    }

    /// Create a client reading the API key from [`API_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env(host: &str, timeout: Duration) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::Config(ConfigError::MissingField {
                field: API_KEY_ENV,
            }))?;
        Self::new(api_key, host, timeout)
    }

    fn time_series_url(&self, key: &SymbolKey) -> Url {
        let mut url = self.base.clone();
        url.set_path(TIME_SERIES_PATH);
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("symbol", key.as_str())
            .append_pair("interval", DAILY_INTERVAL);
        url
    }

    async fn request(&self, key: &SymbolKey) -> std::result::Result<TimeSeries, OriginError> {
        let started = Instant::now();
        let response = self
            .client
            .get(self.time_series_url(key))
            .send()
            .await
            .map_err(|e| OriginError::Unavailable(e.without_url().to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| OriginError::Unavailable(e.without_url().to_string()))?;

        debug!(
            symbol = %key,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Twelve Data response"
        );

        classify(status, &body)
    }
}

/// Validate the configured API host.
pub(crate) fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(ConfigError::InvalidValue {
            field: "origin.host",
            reason: format!("'{host}' is not an http(s) URL"),
        }));
    }
    Ok(url)
}

/// Map an HTTP status and body to a time series or a classified failure.
fn classify(status: StatusCode, body: &[u8]) -> std::result::Result<TimeSeries, OriginError> {
    if status != StatusCode::OK {
        return Err(OriginError::Unavailable(format!(
            "unexpected HTTP status {status}"
        )));
    }

    let response: TimeSeriesResponse = serde_json::from_slice(body)
        .map_err(|e| OriginError::Unavailable(format!("undecodable response: {e}")))?;

    if response.is_error() {
        return Err(match response.code {
            400 | 404 => OriginError::NotFound,
            401 | 429 => OriginError::Rejected {
                code: response.code,
                message: response.message,
            },
            code => OriginError::Unavailable(format!("error {code}: {}", response.message)),
        });
    }

    Ok(response.into_series())
}

#[async_trait]
impl OriginClient for TwelveData {
    async fn fetch(
        &self,
        key: &SymbolKey,
        ctx: &RequestContext,
    ) -> std::result::Result<TimeSeries, OriginError> {
        tokio::select! {
            biased;
            () = ctx.cancelled() => Err(OriginError::Unavailable("request cancelled".into())),
            outcome = self.request(key) => outcome,
        }
    }
}
