//! RAII ownership of one rate-limit token.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use super::{PoolCounters, Token};

/// A token checked out of the pool.
///
/// Dropping the lease, on success, error, panic or cancellation of the owning
/// future, schedules the token's return after the pool cooldown.
pub struct Lease {
    token: Option<Token>,
    cooling: mpsc::UnboundedSender<Token>,
    tokens: mpsc::Sender<Token>,
    counters: Arc<PoolCounters>,
}

impl Lease {
    pub(super) fn new(
        token: Token,
        cooling: mpsc::UnboundedSender<Token>,
        tokens: mpsc::Sender<Token>,
        counters: Arc<PoolCounters>,
    ) -> Self {
        counters.leased.fetch_add(1, Ordering::SeqCst);
        Self {
            token: Some(token),
            cooling,
            tokens,
            counters,
        }
    }

    /// Ordinal of the leased token.
    #[must_use]
    pub fn token(&self) -> usize {
        self.token.map_or(0, |t| t.0)
    }

    /// Give the token back immediately, skipping the cooldown.
    ///
    /// Only valid when the token was never spent on an origin call.
    pub(super) fn release_unused(mut self) {
        if let Some(token) = self.token.take() {
            self.counters.leased.fetch_sub(1, Ordering::SeqCst);
            if let Err(e) = self.tokens.try_send(token) {
                warn!(token = token.0, error = %e, "Failed to return unused token");
            }
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        self.counters.leased.fetch_sub(1, Ordering::SeqCst);
        self.counters.cooling.fetch_add(1, Ordering::SeqCst);
        if self.cooling.send(token).is_err() {
            self.counters.cooling.fetch_sub(1, Ordering::SeqCst);
            warn!(token = token.0, "Return scheduler gone, token lost");
        }
    }
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease").field("token", &self.token).finish()
    }
}
