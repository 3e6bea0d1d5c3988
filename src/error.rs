use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Classified failure of one origin call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OriginError {
    /// The provider does not know the symbol.
    #[error("symbol not found at origin")]
    NotFound,

    /// The provider refused the request (bad API key, quota exhausted).
    #[error("origin rejected request (code {code}): {message}")]
    Rejected { code: u16, message: String },

    /// Transport failure, unexpected status or undecodable body.
    #[error("origin unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("symbol not found: {symbol}")]
    NotFound { symbol: String },

    #[error("origin unavailable: {0}")]
    OriginUnavailable(String),

    #[error("origin rejected request (code {code}): {message}")]
    OriginRejected { code: u16, message: String },

    #[error("failed to persist {symbol}: {source}")]
    PersistenceFailed {
        symbol: String,
        #[source]
        source: Box<Error>,
    },

    #[error("audit delivery failed: {0}")]
    AuditDeliveryFailed(String),

    #[error("{component} is shutting down")]
    ShuttingDown { component: &'static str },

    #[error("operation cancelled")]
    Cancelled,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// Broken internal invariant; never caused by input.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status an inbound layer should answer with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Domain(_) | Self::Json(_) | Self::Parse(_) => 400,
            Self::OriginRejected { .. } => 502,
            Self::OriginUnavailable(_) | Self::ShuttingDown { .. } => 503,
            Self::Cancelled => 499,
            _ => 500,
        }
    }

    /// Whether the same request may succeed if simply retried later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::OriginUnavailable(_) | Self::Connection(_) | Self::Http(_) => true,
            Self::PersistenceFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Attach the requested symbol to a classified origin failure.
    #[must_use]
    pub fn from_origin(err: OriginError, symbol: &str) -> Self {
        match err {
            OriginError::NotFound => Error::NotFound {
                symbol: symbol.to_string(),
            },
            OriginError::Rejected { code, message } => Error::OriginRejected { code, message },
            OriginError::Unavailable(reason) => Error::OriginUnavailable(reason),
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(
            Error::NotFound {
                symbol: "AAPL".into()
            }
            .status_code(),
            404
        );
        assert_eq!(Error::from(DomainError::EmptySymbol).status_code(), 400);
        assert_eq!(Error::OriginUnavailable("down".into()).status_code(), 503);
        assert_eq!(
            Error::OriginRejected {
                code: 429,
                message: "quota".into()
            }
            .status_code(),
            502
        );
        assert_eq!(
            Error::ShuttingDown { component: "pool" }.status_code(),
            503
        );
        assert_eq!(Error::Internal("token queue full".into()).status_code(), 500);
    }

    #[test]
    fn internal_errors_are_not_retryable() {
        assert!(!Error::Internal("token queue full".into()).is_retryable());
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(Error::OriginUnavailable("timeout".into()).is_retryable());
        assert!(!Error::OriginRejected {
            code: 401,
            message: "bad key".into()
        }
        .is_retryable());
        assert!(!Error::Cancelled.is_retryable());

        let wrapped = Error::PersistenceFailed {
            symbol: "AAPL".into(),
            source: Box::new(Error::Connection("pool exhausted".into())),
        };
        assert!(wrapped.is_retryable());
        assert_eq!(wrapped.status_code(), 500);
    }

    #[test]
    fn origin_errors_map_one_to_one() {
        assert!(matches!(
            Error::from_origin(OriginError::NotFound, "MSFT"),
            Error::NotFound { symbol } if symbol == "MSFT"
        ));
        assert!(matches!(
            Error::from_origin(OriginError::Unavailable("502".into()), "MSFT"),
            Error::OriginUnavailable(_)
        ));
        assert!(matches!(
            Error::from_origin(
                OriginError::Rejected {
                    code: 429,
                    message: "slow down".into()
                },
                "MSFT"
            ),
            Error::OriginRejected { code: 429, .. }
        ));
    }
}
