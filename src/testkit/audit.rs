//! Recording audit transports.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::AuditEvent;
use crate::error::{Error, Result};
use crate::port::{Ack, AuditClient, AuditQueue};

// ---------------------------------------------------------------------------
// RecordingQueue
// ---------------------------------------------------------------------------

/// Queue that records `(destination, event)` pairs.
#[derive(Default)]
pub struct RecordingQueue {
    published: Mutex<Vec<(String, AuditEvent)>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
    delay: Mutex<Duration>,
    closes: AtomicUsize,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish fail with a connection error.
    pub fn failing() -> Self {
        let queue = Self::new();
        queue.fail.store(true, Ordering::SeqCst);
        queue
    }

    /// Delay every publish.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = delay;
        self
    }

    pub fn published(&self) -> Vec<(String, AuditEvent)> {
        self.published.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditQueue for RecordingQueue {
    async fn publish(&self, destination: &str, event: &AuditEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Connection("queue unavailable".into()));
        }
        self.published
            .lock()
            .push((destination.to_string(), event.clone()));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingClient
// ---------------------------------------------------------------------------

/// Remote client that records events and answers with a fixed ack.
pub struct RecordingClient {
    logged: Mutex<Vec<AuditEvent>>,
    ack: Ack,
    fail: AtomicBool,
    closes: AtomicUsize,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::answering(Ack::Ok)
    }

    /// Client whose service accepts the call but answers `ack`.
    pub fn answering(ack: Ack) -> Self {
        Self {
            logged: Mutex::new(Vec::new()),
            ack,
            fail: AtomicBool::new(false),
            closes: AtomicUsize::new(0),
        }
    }

    /// Client whose transport fails every call.
    pub fn failing() -> Self {
        let client = Self::new();
        client.fail.store(true, Ordering::SeqCst);
        client
    }

    pub fn logged(&self) -> Vec<AuditEvent> {
        self.logged.lock().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditClient for RecordingClient {
    async fn log(&self, event: &AuditEvent) -> Result<Ack> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Connection("audit service unreachable".into()));
        }
        self.logged.lock().push(event.clone());
        Ok(self.ack)
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
