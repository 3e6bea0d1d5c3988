//! Logging configuration and initialization.

use std::fs::OpenOptions;
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// `json` or `pretty`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Append log lines to this file instead of stderr.
    #[serde(default)]
    pub path: Option<String>,
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or a global
    /// subscriber is already installed.
    pub fn init(&self) -> Result<()> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let json = self.format == "json";

        let installed = match &self.path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(ConfigError::ReadFile)?;
                let builder = fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file));
                if json {
                    builder.json().try_init()
                } else {
                    builder.try_init()
                }
            }
            None => {
                let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
                if json {
                    builder.json().try_init()
                } else {
                    builder.try_init()
                }
            }
        };

        installed.map_err(|e| ConfigError::Other(format!("failed to install logger: {e}")).into())
    }

    pub(super) fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !matches!(self.format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("'{}' is not one of json, pretty", self.format),
            });
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            path: None,
        }
    }
}
