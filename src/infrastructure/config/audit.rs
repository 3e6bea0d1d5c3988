//! Audit transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// `[audit]` section. Both transports may be enabled; the queue is then
/// tried first and the remote service is the fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Publish events to the spool queue.
    #[serde(default)]
    pub queue_enabled: bool,
    /// Directory holding the queue files.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: String,
    /// Queue destination name.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    /// Send events to the remote audit service.
    #[serde(default)]
    pub remote_enabled: bool,
    /// Base URL of the remote audit service.
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Per-request timeout for the remote service, in seconds.
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
}

fn default_spool_dir() -> String {
    "audit-spool".into()
}

fn default_queue_name() -> String {
    "audit".into()
}

fn default_remote_timeout_secs() -> u64 {
    5
}

impl AuditConfig {
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queue_enabled: false,
            spool_dir: default_spool_dir(),
            queue_name: default_queue_name(),
            remote_enabled: false,
            remote_url: None,
            remote_timeout_secs: default_remote_timeout_secs(),
        }
    }
}
