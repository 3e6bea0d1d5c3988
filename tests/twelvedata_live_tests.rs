//! Live tests against the Twelve Data API.
//!
//! Gated behind the `integration-tests` feature and marked `#[ignore]`.
//! Each test makes one real request against the free-tier quota.
//!
//! ```bash
//! export TWELVE_DATA_API_KEY="your-key"
//! cargo test --features integration-tests --test twelvedata_live_tests -- --ignored
//! ```

#![cfg(feature = "integration-tests")]

use std::time::Duration;

use finance_api::adapter::outbound::twelvedata::TwelveData;
use finance_api::application::mapper::time_series_to_symbol;
use finance_api::domain::{RequestContext, SymbolKey};
use finance_api::error::OriginError;
use finance_api::port::OriginClient;

const HOST: &str = "https://api.twelvedata.com";

fn create_client() -> Option<TwelveData> {
    match TwelveData::from_env(HOST, Duration::from_secs(20)) {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping Twelve Data test: {e}");
            None
        }
    }
}

#[tokio::test]
#[ignore = "requires TWELVE_DATA_API_KEY and network access"]
async fn daily_series_maps_to_symbol() {
    let Some(client) = create_client() else {
        return;
    };
    let key = SymbolKey::try_new("AAPL").unwrap();

    let series = client
        .fetch(&key, &RequestContext::new())
        .await
        .expect("time_series request failed");
    let symbol = time_series_to_symbol(&key, &series).expect("series should map");

    assert_eq!(symbol.symbol, key);
    assert!(!symbol.values.is_empty(), "expected daily observations");
    assert!(symbol.values.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
#[ignore = "requires TWELVE_DATA_API_KEY and network access"]
async fn unknown_symbol_is_not_found() {
    let Some(client) = create_client() else {
        return;
    };
    let key = SymbolKey::try_new("NOSUCHTICKER123").unwrap();

    let err = client
        .fetch(&key, &RequestContext::new())
        .await
        .unwrap_err();

    assert_eq!(err, OriginError::NotFound);
}
