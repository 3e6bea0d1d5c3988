//! Builders for domain primitives used across tests.

use crate::domain::{AuditAction, AuditEvent, PricePoint, Symbol, SymbolKey};
use crate::port::{TimeSeries, TimeSeriesMeta, TimeSeriesValue};

/// Parse a [`SymbolKey`], panicking on invalid input.
pub fn key(raw: &str) -> SymbolKey {
    SymbolKey::try_new(raw).expect("valid symbol key")
}

/// Daily observation with fixed open/high/low and the given close.
pub fn price(date: &str, close: &str) -> PricePoint {
    PricePoint::parse(date, "100", "110", "90", close, Some("1000")).expect("valid price")
}

/// Symbol with a name and a single observation.
pub fn symbol(raw: &str) -> Symbol {
    let mut symbol = Symbol::new(key(raw));
    symbol.name = format!("{raw} Inc");
    symbol.currency = "USD".into();
    symbol.values.push(price("2024-03-01", "101.5"));
    symbol
}

/// Provider time series for `raw` with one observation.
pub fn series(raw: &str) -> TimeSeries {
    TimeSeries {
        meta: TimeSeriesMeta {
            symbol: raw.to_string(),
            interval: "1day".into(),
            currency: "USD".into(),
            exchange: "NASDAQ".into(),
            exchange_timezone: "America/New_York".into(),
            mic_code: "XNGS".into(),
            kind: "Common Stock".into(),
            ..TimeSeriesMeta::default()
        },
        values: vec![TimeSeriesValue {
            datetime: "2024-03-01".into(),
            open: "100".into(),
            high: "110".into(),
            low: "90".into(),
            close: "105".into(),
            volume: Some("1000".into()),
        }],
    }
}

/// Symbol-created audit event.
pub fn event(raw: &str) -> AuditEvent {
    AuditEvent::symbol(AuditAction::Created, raw, "test-request")
}
