//! Symbol cache configuration.

use std::time::Duration;

use serde::Deserialize;

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached symbol in seconds.
    #[serde(default = "default_symbol_ttl_secs")]
    pub symbol_ttl_secs: u64,
}

fn default_symbol_ttl_secs() -> u64 {
    3600
}

impl CacheConfig {
    #[must_use]
    pub fn symbol_ttl(&self) -> Duration {
        Duration::from_secs(self.symbol_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            symbol_ttl_secs: default_symbol_ttl_secs(),
        }
    }
}
