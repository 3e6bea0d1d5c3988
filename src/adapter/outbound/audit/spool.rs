//! File-backed audit queue.
//!
//! Each destination is an append-only JSON-lines file under the spool
//! directory; a downstream shipper consumes and truncates them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::AuditEvent;
use crate::error::{ConfigError, Error, Result};
use crate::port::AuditQueue;

const EXTENSION: &str = "jsonl";

#[derive(Default)]
struct SpoolState {
    writers: HashMap<String, BufWriter<File>>,
    closed: bool,
}

/// JSON-lines implementation of [`AuditQueue`].
pub struct SpoolQueue {
    dir: PathBuf,
    state: Mutex<SpoolState>,
}

impl SpoolQueue {
    /// Open a spool rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            state: Mutex::new(SpoolState::default()),
        })
    }

    /// File backing `destination`.
    #[must_use]
    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir.join(format!("{destination}.{EXTENSION}"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn check_destination(destination: &str) -> Result<()> {
    let valid = !destination.is_empty()
        && destination
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !destination.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "audit.queue_name",
            reason: format!("'{destination}' is not a valid destination name"),
        }))
    }
}

#[async_trait]
impl AuditQueue for SpoolQueue {
    async fn publish(&self, destination: &str, event: &AuditEvent) -> Result<()> {
        check_destination(destination)?;
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(Error::Connection("audit spool is closed".into()));
        }

        if !state.writers.contains_key(destination) {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(destination))
                .await?;
            state
                .writers
                .insert(destination.to_string(), BufWriter::new(file));
        }
        let Some(writer) = state.writers.get_mut(destination) else {
            return Err(Error::Connection(format!(
                "no writer for destination {destination}"
            )));
        };

        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.closed = true;
        for (destination, mut writer) in state.writers.drain() {
            writer.flush().await?;
            writer.get_mut().sync_all().await?;
            debug!(destination = %destination, "Audit spool closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AuditAction;

    #[tokio::test]
    async fn publish_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let queue = SpoolQueue::open(dir.path().join("spool")).await.unwrap();

        queue
            .publish("audit", &AuditEvent::symbol(AuditAction::Created, "AAPL", "r1"))
            .await
            .unwrap();
        queue
            .publish("audit", &AuditEvent::symbol(AuditAction::Deleted, "AAPL", "r2"))
            .await
            .unwrap();
        queue.close().await.unwrap();

        let content = std::fs::read_to_string(queue.path_for("audit")).unwrap();
        let events: Vec<AuditEvent> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].action, AuditAction::Deleted);
        assert_eq!(events[0].correlation_id, "r1");
    }

    #[tokio::test]
    async fn rejects_path_like_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let queue = SpoolQueue::open(dir.path()).await.unwrap();
        let event = AuditEvent::symbol(AuditAction::Created, "AAPL", "");

        for bad in ["", "../escape", "a/b", ".hidden"] {
            assert!(queue.publish(bad, &event).await.is_err(), "{bad}");
        }
    }

    #[tokio::test]
    async fn publish_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let queue = SpoolQueue::open(dir.path()).await.unwrap();
        queue.close().await.unwrap();

        let err = queue
            .publish("audit", &AuditEvent::symbol(AuditAction::Created, "AAPL", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
