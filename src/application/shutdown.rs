//! Bounded-deadline shutdown.
//!
//! ```text
//! Running ──shutdown()──▶ Draining ──drained──▶ Closed      (exit 0)
//!                                  └─deadline─▶ ForcedExit  (exit 1)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info};

use crate::application::audit::AuditDispatcher;
use crate::application::pool::RateLimitedPool;
use crate::port::SymbolStore;

/// Lifecycle of the process as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    Draining,
    /// Everything drained and the store closed within the deadline.
    Closed,
    /// The deadline elapsed first; remaining work is abandoned.
    ForcedExit,
}

impl ShutdownState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::ForcedExit)
    }

    /// Process exit code for a terminal state.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Closed => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Closed => "closed",
            Self::ForcedExit => "forced_exit",
        };
        f.write_str(name)
    }
}

/// Drains the pool and the audit dispatcher concurrently, then closes the
/// store, all within one deadline.
pub struct ShutdownCoordinator {
    pool: RateLimitedPool,
    audit: AuditDispatcher,
    store: Arc<dyn SymbolStore>,
    deadline: Duration,
    state: watch::Sender<ShutdownState>,
}

impl ShutdownCoordinator {
    #[must_use]
    pub fn new(
        pool: RateLimitedPool,
        audit: AuditDispatcher,
        store: Arc<dyn SymbolStore>,
        deadline: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            pool,
            audit,
            store,
            deadline,
            state,
        }
    }

    #[must_use]
    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    /// Run the shutdown sequence and return its terminal state.
    ///
    /// Only the first call drives the sequence; later or concurrent calls wait
    /// for it and return the same terminal state.
    pub async fn shutdown(&self) -> ShutdownState {
        let started_here = self.state.send_if_modified(|state| {
            if *state == ShutdownState::Running {
                *state = ShutdownState::Draining;
                true
            } else {
                false
            }
        });

        if !started_here {
            let mut rx = self.state.subscribe();
            return match rx.wait_for(|state| state.is_terminal()).await {
                Ok(state) => *state,
                Err(_) => ShutdownState::ForcedExit,
            };
        }

        let started = Instant::now();
        info!(
            deadline_ms = self.deadline.as_millis() as u64,
            pending_audit = self.audit.pending(),
            in_flight = self.pool.stats().in_flight,
            "Shutting down"
        );

        let drained = tokio::time::timeout(self.deadline, async {
            tokio::join!(self.audit.drain(), self.pool.drain());
        })
        .await;

        let terminal = match drained {
            Ok(()) => {
                if let Err(e) = self.store.close().await {
                    error!(error = %e, "Failed to close store");
                }
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Shutdown complete"
                );
                ShutdownState::Closed
            }
            Err(_) => {
                error!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    pending_audit = self.audit.pending(),
                    in_flight = self.pool.stats().in_flight,
                    "Shutdown deadline exceeded, forcing exit"
                );
                ShutdownState::ForcedExit
            }
        };

        self.state.send_replace(terminal);
        terminal
    }
}
