//! Mock [`OriginClient`] for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::domain::{RequestContext, SymbolKey};
use crate::error::OriginError;
use crate::port::{OriginClient, TimeSeries};

use super::domain;

/// Start and finish instants of one call.
#[derive(Debug, Clone, Copy)]
pub struct CallWindow {
    pub started: Instant,
    pub finished: Instant,
}

// ---------------------------------------------------------------------------
// ScriptedOrigin
// ---------------------------------------------------------------------------

/// An origin with per-symbol scripted outcomes and a fixed latency.
///
/// Symbols without a script get a one-observation series. Tracks the number
/// of calls, the highest number of calls running at once, and the window of
/// every completed call.
pub struct ScriptedOrigin {
    scripts: Mutex<HashMap<SymbolKey, VecDeque<Result<TimeSeries, OriginError>>>>,
    latency: Duration,
    panic_on: Mutex<Option<SymbolKey>>,
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
    windows: Mutex<Vec<CallWindow>>,
}

impl ScriptedOrigin {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            latency: Duration::ZERO,
            panic_on: Mutex::new(None),
            calls: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            windows: Mutex::new(Vec::new()),
        }
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue an outcome for `symbol`; consumed in order, one per call.
    pub fn with_outcome(self, symbol: &str, outcome: Result<TimeSeries, OriginError>) -> Self {
        self.scripts
            .lock()
            .entry(domain::key(symbol))
            .or_default()
            .push_back(outcome);
        self
    }

    /// Panic when `symbol` is fetched.
    pub fn panicking_on(self, symbol: &str) -> Self {
        *self.panic_on.lock() = Some(domain::key(symbol));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Windows of completed calls, in completion order.
    pub fn windows(&self) -> Vec<CallWindow> {
        self.windows.lock().clone()
    }
}

impl Default for ScriptedOrigin {
    fn default() -> Self {
        Self::new()
    }
}

struct Running<'a>(&'a AtomicUsize);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl OriginClient for ScriptedOrigin {
    async fn fetch(
        &self,
        key: &SymbolKey,
        _ctx: &RequestContext,
    ) -> Result<TimeSeries, OriginError> {
        let started = Instant::now();
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now_running, Ordering::SeqCst);
        let _running = Running(&self.running);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.panic_on.lock().as_ref() == Some(key) {
            panic!("scripted origin panic for {key}");
        }

        let scripted = self
            .scripts
            .lock()
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        let outcome = scripted.unwrap_or_else(|| Ok(domain::series(key.as_str())));

        self.windows.lock().push(CallWindow {
            started,
            finished: Instant::now(),
        });
        outcome
    }
}
