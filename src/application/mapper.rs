//! Conversion of provider time series into domain symbols.

use crate::domain::{Exchange, PricePoint, Symbol, SymbolKey};
use crate::error::{Error, Result};
use crate::port::{TimeSeries, TimeSeriesValue};

/// Build a [`Symbol`] for `key` from a fetched daily time series.
///
/// All observations are kept, oldest first. A series without observations
/// yields a symbol with an empty price history. The exchange is taken from
/// the series metadata when the provider names one.
///
/// # Errors
///
/// Returns [`Error::OriginUnavailable`] when an observation is malformed; the
/// provider sent a payload this service cannot use.
pub fn time_series_to_symbol(key: &SymbolKey, series: &TimeSeries) -> Result<Symbol> {
    let meta = &series.meta;
    let mut symbol = Symbol::new(key.clone());
    symbol.kind.clone_from(&meta.kind);
    symbol.currency.clone_from(&meta.currency);
    symbol.currency_base.clone_from(&meta.currency_base);
    symbol.currency_quote.clone_from(&meta.currency_quote);

    if !meta.exchange.trim().is_empty() {
        symbol.exchanges.push(Exchange {
            name: meta.exchange.clone(),
            country: String::new(),
            timezone: meta.exchange_timezone.clone(),
            mic_code: meta.mic_code.clone(),
        });
    }

    symbol.values = series
        .values
        .iter()
        .map(parse_value)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::OriginUnavailable(format!("malformed observation for {key}: {e}")))?;
    symbol.sort_values();
    symbol.values.dedup_by_key(|p| p.date);

    Ok(symbol)
}

fn parse_value(value: &TimeSeriesValue) -> std::result::Result<PricePoint, crate::domain::DomainError> {
    PricePoint::parse(
        &value.datetime,
        &value.open,
        &value.high,
        &value.low,
        &value.close,
        value.volume.as_deref(),
    )
}
