//! Wire types of the Twelve Data `time_series` endpoint.

use serde::Deserialize;

use crate::port::{TimeSeries, TimeSeriesMeta, TimeSeriesValue};

/// Response body. Successful and error responses share one shape: an error
/// carries `status = "error"`, a numeric `code` and a `message`.
#[derive(Debug, Deserialize)]
pub(super) struct TimeSeriesResponse {
    #[serde(default)]
    pub(super) meta: Option<TimeSeriesMeta>,
    #[serde(default)]
    pub(super) values: Vec<TimeSeriesValue>,
    #[serde(default)]
    pub(super) status: String,
    #[serde(default)]
    pub(super) code: u16,
    #[serde(default)]
    pub(super) message: String,
}

impl TimeSeriesResponse {
    pub(super) fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }

    pub(super) fn into_series(self) -> TimeSeries {
        TimeSeries {
            meta: self.meta.unwrap_or_default(),
            values: self.values,
        }
    }
}
