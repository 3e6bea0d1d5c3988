//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Configuration is loaded from a TOML file; the Twelve Data API
//! key is only ever read from the `TWELVE_DATA_API_KEY` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use finance_api::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging()?;
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::audit::AuditConfig;
use super::cache::CacheConfig;
use super::logging::LoggingConfig;
use super::origin::OriginConfig;
use super::shutdown::ShutdownConfig;
use crate::adapter::outbound::twelvedata::parse_host;
use crate::error::{ConfigError, Error, Result};

/// Main application configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Market-data origin and its rate limit.
    #[serde(default)]
    pub origin: OriginConfig,

    /// Symbol cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Audit transports.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Shutdown deadline.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "finance-api.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "finance-api.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            origin: OriginConfig::default(),
            cache: CacheConfig::default(),
            audit: AuditConfig::default(),
            shutdown: ShutdownConfig::default(),
            database: default_database_path(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging from the `[logging]` section.
    ///
    /// # Errors
    ///
    /// See [`LoggingConfig::init`].
    pub fn init_logging(&self) -> Result<()> {
        self.logging.init()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        self.logging.validate()?;

        parse_host(&self.origin.host).map_err(|e| match e {
            Error::Config(inner) => inner,
            other => ConfigError::InvalidValue {
                field: "origin.host",
                reason: other.to_string(),
            },
        })?;
        if self.origin.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "origin.timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        self.origin.pool().validate()?;

        if self.cache.symbol_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.symbol_ttl_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.audit.queue_enabled && self.audit.queue_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "audit.queue_name",
            }
            .into());
        }
        if self.audit.remote_enabled {
            let Some(url) = self.audit.remote_url.as_deref() else {
                return Err(ConfigError::MissingField {
                    field: "audit.remote_url",
                }
                .into());
            };
            url::Url::parse(url).map_err(|e| ConfigError::InvalidValue {
                field: "audit.remote_url",
                reason: e.to_string(),
            })?;
        }

        if self.shutdown.deadline_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "shutdown.deadline_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        Ok(())
    }
}
