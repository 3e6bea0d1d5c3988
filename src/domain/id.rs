//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Maximum accepted length of a symbol identifier.
pub const MAX_SYMBOL_LEN: usize = 32;

/// Symbol identifier (e.g. `AAPL`, `EUR/USD`) - newtype for type safety.
///
/// Keys are normalized on construction: surrounding whitespace is trimmed and
/// letters are upper-cased, so `" aapl "` and `"AAPL"` address the same
/// cache, store and origin entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolKey(String);

impl SymbolKey {
    /// Create a validated, normalized `SymbolKey`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty, longer than [`MAX_SYMBOL_LEN`],
    /// or contains whitespace/control characters.
    pub fn try_new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        if trimmed.chars().count() > MAX_SYMBOL_LEN {
            return Err(DomainError::SymbolTooLong {
                symbol: trimmed.to_string(),
                max: MAX_SYMBOL_LEN,
            });
        }
        if let Some(found) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(DomainError::InvalidSymbolCharacter {
                symbol: trimmed.to_string(),
                found,
            });
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Parse a key taken from a URL path segment.
    ///
    /// Currency pairs travel as `EUR-USD` in paths because `/` is a separator;
    /// the first dash is turned back into a slash.
    pub fn from_path_segment(segment: &str) -> Result<Self, DomainError> {
        Self::try_new(segment.replacen('-', "/", 1))
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SymbolKey {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl TryFrom<&str> for SymbolKey {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl From<SymbolKey> for String {
    fn from(key: SymbolKey) -> Self {
        key.0
    }
}
