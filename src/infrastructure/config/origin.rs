//! Market-data origin and rate-limit configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::PoolConfig;

/// `[origin]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OriginConfig {
    /// Twelve Data API base URL.
    #[serde(default = "default_host")]
    pub host: String,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Calls allowed per cooldown window (token count).
    #[serde(default = "default_rate_limit")]
    pub rate_limit: usize,
    /// Seconds a spent token stays unavailable.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_host() -> String {
    "https://api.twelvedata.com".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_rate_limit() -> usize {
    8 // Twelve Data free tier: 8 requests per minute
}

fn default_cooldown_secs() -> u64 {
    60
}

impl OriginConfig {
    #[must_use]
    pub fn pool(&self) -> PoolConfig {
        PoolConfig {
            size: self.rate_limit,
            cooldown: Duration::from_secs(self.cooldown_secs),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_secs: default_timeout_secs(),
            rate_limit: default_rate_limit(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}
