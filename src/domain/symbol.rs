//! Market symbol snapshot: descriptive attributes plus daily price history.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::SymbolKey;

/// Date format used by daily observations.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A trading venue on which a symbol is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mic_code: String,
}

/// One daily OHLCV observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Forex and some crypto series carry no volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl PricePoint {
    /// Build an observation from the provider's textual fields.
    ///
    /// The date may carry a time component (`2024-03-01 15:59:00`); only the
    /// calendar day is kept. An empty volume is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the date or any price field does not parse.
    pub fn parse(
        date: &str,
        open: &str,
        high: &str,
        low: &str,
        close: &str,
        volume: Option<&str>,
    ) -> Result<Self, DomainError> {
        let day = date.get(..10).unwrap_or(date);
        let date = NaiveDate::parse_from_str(day, DATE_FORMAT)
            .map_err(|_| DomainError::InvalidDate(date.to_string()))?;
        let volume = match volume.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_decimal("volume", raw)?),
        };
        Ok(Self {
            date,
            open: parse_decimal("open", open)?,
            high: parse_decimal("high", high)?,
            low: parse_decimal("low", low)?,
            close: parse_decimal("close", close)?,
            volume,
        })
    }
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(raw.trim()).map_err(|_| DomainError::InvalidPrice {
        field,
        value: raw.to_string(),
    })
}

/// Snapshot of a market symbol as held by the cache and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol: SymbolKey,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Instrument type reported by the provider (`Common Stock`, `Physical Currency`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency_base: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency_quote: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exchanges: Vec<Exchange>,
    /// Observations ordered by ascending date.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<PricePoint>,
}

impl Symbol {
    /// Create an empty snapshot for `key`.
    #[must_use]
    pub fn new(key: SymbolKey) -> Self {
        Self {
            symbol: key,
            name: String::new(),
            kind: String::new(),
            currency: String::new(),
            currency_base: String::new(),
            currency_quote: String::new(),
            exchanges: Vec::new(),
            values: Vec::new(),
        }
    }

    /// The identifier this snapshot is stored and cached under.
    #[must_use]
    pub fn key(&self) -> &SymbolKey {
        &self.symbol
    }

    /// Most recent observation, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&PricePoint> {
        self.values.last()
    }

    /// Restore ascending date order.
    pub fn sort_values(&mut self) {
        self.values.sort_by_key(|p| p.date);
    }

    /// Check invariants that the store relies on.
    ///
    /// # Errors
    ///
    /// Returns an error for unnamed exchanges or duplicate observation dates.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.exchanges.iter().any(|e| e.name.trim().is_empty()) {
            return Err(DomainError::EmptyExchangeName);
        }
        let mut dates: Vec<NaiveDate> = self.values.iter().map(|p| p.date).collect();
        dates.sort_unstable();
        if let Some(pair) = dates.windows(2).find(|w| w[0] == w[1]) {
            return Err(DomainError::DuplicateObservation { date: pair[0] });
        }
        Ok(())
    }
}

/// Partial update of a stored symbol.
///
/// `None` fields are left untouched. Exchanges are upserted by name
/// (case-insensitive) and observations by date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolUpdate {
    pub symbol: Option<SymbolKey>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub currency_base: Option<String>,
    #[serde(default)]
    pub currency_quote: Option<String>,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
    #[serde(default)]
    pub values: Vec<PricePoint>,
}

impl SymbolUpdate {
    /// Create an empty update for `key`.
    #[must_use]
    pub fn new(key: SymbolKey) -> Self {
        Self {
            symbol: Some(key),
            ..Self::default()
        }
    }

    /// Key of the symbol being updated.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptySymbol`] when the update names no symbol.
    pub fn key(&self) -> Result<&SymbolKey, DomainError> {
        self.symbol.as_ref().ok_or(DomainError::EmptySymbol)
    }

    /// Apply this update to a stored snapshot in place.
    pub fn apply(&self, target: &mut Symbol) {
        let fields = [
            (&self.name, &mut target.name),
            (&self.kind, &mut target.kind),
            (&self.currency, &mut target.currency),
            (&self.currency_base, &mut target.currency_base),
            (&self.currency_quote, &mut target.currency_quote),
        ];
        for (update, field) in fields {
            if let Some(value) = update {
                field.clone_from(value);
            }
        }

        for exchange in &self.exchanges {
            match target
                .exchanges
                .iter_mut()
                .find(|e| e.name.eq_ignore_ascii_case(&exchange.name))
            {
                Some(existing) => *existing = exchange.clone(),
                None => target.exchanges.push(exchange.clone()),
            }
        }

        for point in &self.values {
            match target.values.iter_mut().find(|p| p.date == point.date) {
                Some(existing) => *existing = point.clone(),
                None => target.values.push(point.clone()),
            }
        }
        target.sort_values();
    }
}

impl From<&Symbol> for SymbolUpdate {
    /// Merge form of a full snapshot: non-empty descriptive fields replace
    /// the stored ones, exchanges and observations are upserted.
    fn from(symbol: &Symbol) -> Self {
        let non_empty = |value: &String| (!value.is_empty()).then(|| value.clone());
        Self {
            symbol: Some(symbol.symbol.clone()),
            name: non_empty(&symbol.name),
            kind: non_empty(&symbol.kind),
            currency: non_empty(&symbol.currency),
            currency_base: non_empty(&symbol.currency_base),
            currency_quote: non_empty(&symbol.currency_quote),
            exchanges: symbol.exchanges.clone(),
            values: symbol.values.clone(),
        }
    }
}
