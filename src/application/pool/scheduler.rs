//! Background token-return task.
//!
//! One task per pool owns a [`DelayQueue`] keyed by cooldown expiry. Leases
//! hand their token over on drop; the task puts it back into the token queue
//! once its cooldown has elapsed.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::time::DelayQueue;
use tracing::{debug, warn};

use super::{PoolCounters, Token};

pub(super) struct ReturnScheduler {
    pub(super) cooling: mpsc::UnboundedReceiver<Token>,
    pub(super) tokens: mpsc::Sender<Token>,
    pub(super) cooldown: Duration,
    pub(super) counters: Arc<PoolCounters>,
}

impl ReturnScheduler {
    pub(super) async fn run(mut self) {
        let mut queue: DelayQueue<Token> = DelayQueue::new();

        loop {
            tokio::select! {
                received = self.cooling.recv() => match received {
                    Some(token) => {
                        queue.insert(token, self.cooldown);
                    }
                    None => break,
                },
                Some(expired) = queue.next(), if !queue.is_empty() => {
                    self.restore(expired.into_inner());
                }
            }
        }

        debug!(pending = queue.len(), "Token return scheduler stopped");
    }

    fn restore(&self, token: Token) {
        self.counters.cooling.fetch_sub(1, Ordering::SeqCst);
        match self.tokens.try_send(token) {
            Ok(()) => debug!(token = token.0, "Token restored"),
            // Only reachable if the pool was dropped or a token was duplicated.
            Err(e) => warn!(token = token.0, error = %e, "Failed to restore token"),
        }
    }
}
