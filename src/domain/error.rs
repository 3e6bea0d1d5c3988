//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and `validate`
//! methods when symbol data violates a domain rule.
//!
//! # Examples
//!
//! ```
//! use finance_api::domain::error::DomainError;
//! use finance_api::domain::SymbolKey;
//!
//! let result = SymbolKey::try_new("   ");
//! assert!(matches!(result, Err(DomainError::EmptySymbol)));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Symbol identifiers must contain at least one visible character.
    #[error("symbol cannot be empty")]
    EmptySymbol,

    /// Symbol identifiers are bounded to keep keys storable and cacheable.
    #[error("symbol '{symbol}' is longer than {max} characters")]
    SymbolTooLong {
        /// The rejected symbol.
        symbol: String,
        /// Maximum accepted length.
        max: usize,
    },

    /// Symbol identifiers may not contain whitespace or control characters.
    #[error("symbol '{symbol}' contains invalid character {found:?}")]
    InvalidSymbolCharacter {
        /// The rejected symbol.
        symbol: String,
        /// The offending character.
        found: char,
    },

    /// A price observation field could not be interpreted as a decimal.
    #[error("invalid {field} value '{value}'")]
    InvalidPrice {
        /// Which OHLCV field was malformed.
        field: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A price observation carries an unparseable date.
    #[error("invalid observation date '{0}'")]
    InvalidDate(String),

    /// Two price observations for the same symbol share a date.
    #[error("duplicate price observation for {date}")]
    DuplicateObservation {
        /// The repeated date.
        date: chrono::NaiveDate,
    },

    /// An exchange listing must be named.
    #[error("exchange name cannot be empty")]
    EmptyExchangeName,
}
