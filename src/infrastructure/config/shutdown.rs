//! Shutdown configuration.

use std::time::Duration;

use serde::Deserialize;

/// `[shutdown]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownConfig {
    /// Upper bound on draining before the process is forced to exit.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_deadline_secs() -> u64 {
    30
}

impl ShutdownConfig {
    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}
