//! Canonical test configurations.

use std::time::Duration;

use crate::application::PoolConfig;
use crate::infrastructure::config::settings::Config;

/// Pool config with the given size and cooldown in seconds.
pub fn pool(size: usize, cooldown_secs: u64) -> PoolConfig {
    PoolConfig {
        size,
        cooldown: Duration::from_secs(cooldown_secs),
    }
}

/// Application config backed by `database`, with short limits and audit off.
pub fn app(database: &str) -> Config {
    let mut config = Config::default();
    config.database = database.to_string();
    config.origin.rate_limit = 2;
    config.origin.cooldown_secs = 1;
    config.shutdown.deadline_secs = 5;
    config
}
