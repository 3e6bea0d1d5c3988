//! Origin port for the third-party market-data provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{RequestContext, SymbolKey};
use crate::error::OriginError;

/// Daily time series as delivered by the provider, still in wire form.
///
/// Numbers stay strings here; conversion to decimals happens in the mapper so
/// that a malformed observation is reported against the symbol it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub meta: TimeSeriesMeta,
    #[serde(default)]
    pub values: Vec<TimeSeriesValue>,
}

/// Descriptive block of a time series response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesMeta {
    pub symbol: String,
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub currency_base: String,
    #[serde(default)]
    pub currency_quote: String,
    #[serde(default)]
    pub exchange_timezone: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub mic_code: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// One daily observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesValue {
    pub datetime: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    #[serde(default)]
    pub volume: Option<String>,
}

/// A single outbound call to the market-data provider.
///
/// Implementations are stateless with respect to rate limiting; callers gate
/// every invocation through `RateLimitedPool`.
#[async_trait]
pub trait OriginClient: Send + Sync {
    /// Fetch the daily time series of `key`.
    ///
    /// Must return promptly with [`OriginError::Unavailable`] once `ctx` is
    /// cancelled.
    async fn fetch(
        &self,
        key: &SymbolKey,
        ctx: &RequestContext,
    ) -> Result<TimeSeries, OriginError>;
}
