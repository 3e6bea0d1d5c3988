//! Rate-limited origin pool.
//!
//! Every outbound call to the market-data provider needs one of `N` tokens.
//! A spent token is unavailable for a fixed cooldown, so at most `N` calls
//! start within any cooldown window. Waiting callers are served in FIFO
//! order.
//!
//! # Architecture
//!
//! ```text
//!  call() ──▶ token queue (mpsc, capacity N) ──▶ Lease ──▶ origin.fetch()
//!                   ▲                              │ drop
//!                   │ after cooldown               ▼
//!                   └──────────── ReturnScheduler (DelayQueue)
//! ```

mod lease;
mod scheduler;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::application::drain::DrainBarrier;
use crate::domain::{RequestContext, SymbolKey};
use crate::error::{ConfigError, Error, Result};
use crate::port::{OriginClient, TimeSeries};

pub use lease::Lease;
use scheduler::ReturnScheduler;

const COMPONENT: &str = "pool";

/// One unit of rate capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token(usize);

/// Counters shared between the pool, its leases and the return scheduler.
struct PoolCounters {
    leased: AtomicUsize,
    cooling: AtomicUsize,
}

/// Pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of tokens (`N`).
    pub size: usize,
    /// Time a spent token stays out of circulation.
    pub cooldown: Duration,
}

impl PoolConfig {
    /// Reject configurations under which the pool could never make progress.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit",
                reason: "pool size must be greater than 0".into(),
            });
        }
        if self.cooldown.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "cooldown_secs",
                reason: "cooldown must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// Point-in-time view of where the tokens are.
///
/// At quiescent points `queued + leased + cooling_down == capacity`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub queued: usize,
    pub leased: usize,
    pub cooling_down: usize,
    pub in_flight: usize,
}

struct PoolInner {
    origin: Arc<dyn OriginClient>,
    /// Fair mutex: waiters acquire tokens in arrival order.
    available: Mutex<mpsc::Receiver<Token>>,
    tokens: mpsc::Sender<Token>,
    cooling: mpsc::UnboundedSender<Token>,
    counters: Arc<PoolCounters>,
    barrier: DrainBarrier,
    config: PoolConfig,
}

/// Bounded, cooldown-throttled gate in front of an [`OriginClient`].
///
/// Cheap to clone; clones share tokens and the drain barrier.
#[derive(Clone)]
pub struct RateLimitedPool {
    inner: Arc<PoolInner>,
}

impl RateLimitedPool {
    /// Create a pool with `config.size` tokens and spawn its return scheduler.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(origin: Arc<dyn OriginClient>, config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let (tokens, available) = mpsc::channel(config.size);
        for ordinal in 0..config.size {
            tokens
                .try_send(Token(ordinal))
                .map_err(|e| Error::Internal(format!("token queue rejected initial fill: {e}")))?;
        }

        let (cooling, cooling_rx) = mpsc::unbounded_channel();
        let counters = Arc::new(PoolCounters {
            leased: AtomicUsize::new(0),
            cooling: AtomicUsize::new(0),
        });

        tokio::spawn(
            ReturnScheduler {
                cooling: cooling_rx,
                tokens: tokens.clone(),
                cooldown: config.cooldown,
                counters: Arc::clone(&counters),
            }
            .run(),
        );

        info!(
            size = config.size,
            cooldown_ms = config.cooldown.as_millis() as u64,
            "Rate-limited pool started"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                origin,
                available: Mutex::new(available),
                tokens,
                cooling,
                counters,
                barrier: DrainBarrier::new(),
                config,
            }),
        })
    }

    /// Wait for a token. No timeout; gives up only when `ctx` is cancelled.
    pub async fn acquire(&self, ctx: &RequestContext) -> Result<Lease> {
        let token = tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(Error::Cancelled),
            token = async { self.inner.available.lock().await.recv().await } => token,
        };
        let token = token.ok_or(Error::ShuttingDown {
            component: COMPONENT,
        })?;

        Ok(Lease::new(
            token,
            self.inner.cooling.clone(),
            self.inner.tokens.clone(),
            Arc::clone(&self.inner.counters),
        ))
    }

    /// Perform one origin call under a token.
    ///
    /// The token's return is scheduled when the call finishes, whatever the
    /// outcome. Rejected with [`Error::ShuttingDown`] once draining has begun.
    pub async fn call(&self, key: &SymbolKey, ctx: &RequestContext) -> Result<TimeSeries> {
        if self.inner.barrier.is_closed() {
            return Err(Error::ShuttingDown {
                component: COMPONENT,
            });
        }

        let lease = self.acquire(ctx).await?;
        let Some(guard) = self.inner.barrier.enter() else {
            lease.release_unused();
            return Err(Error::ShuttingDown {
                component: COMPONENT,
            });
        };

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            () = ctx.cancelled() => Err(Error::Cancelled),
            fetched = self.inner.origin.fetch(key, ctx) => {
                fetched.map_err(|e| Error::from_origin(e, key.as_str()))
            }
        };

        debug!(
            symbol = %key,
            token = lease.token(),
            request_id = ctx.request_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "Origin call finished"
        );

        drop(guard);
        drop(lease);
        outcome
    }

    /// Stop accepting calls and wait for in-flight ones to finish.
    ///
    /// Tokens still cooling down are not waited for.
    pub async fn drain(&self) {
        let in_flight = self.inner.barrier.in_flight();
        if in_flight > 0 {
            info!(in_flight, "Draining pool");
        }
        self.inner.barrier.drain().await;
        debug!("Pool drained");
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let tokens = &self.inner.tokens;
        PoolStats {
            capacity: self.inner.config.size,
            queued: tokens.max_capacity() - tokens.capacity(),
            leased: self.inner.counters.leased.load(Ordering::SeqCst),
            cooling_down: self.inner.counters.cooling.load(Ordering::SeqCst),
            in_flight: self.inner.barrier.in_flight(),
        }
    }

    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.inner.config
    }
}

impl std::fmt::Debug for RateLimitedPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedPool")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        let leased = self.counters.leased.load(Ordering::SeqCst);
        if leased > 0 {
            warn!(leased, "Pool dropped with tokens still leased");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::OriginError;

    struct Echo;

    #[async_trait]
    impl OriginClient for Echo {
        async fn fetch(
            &self,
            key: &SymbolKey,
            _ctx: &RequestContext,
        ) -> std::result::Result<TimeSeries, OriginError> {
            let mut series = TimeSeries::default();
            series.meta.symbol = key.to_string();
            Ok(series)
        }
    }

    struct Missing;

    #[async_trait]
    impl OriginClient for Missing {
        async fn fetch(
            &self,
            _key: &SymbolKey,
            _ctx: &RequestContext,
        ) -> std::result::Result<TimeSeries, OriginError> {
            Err(OriginError::NotFound)
        }
    }

    fn config(size: usize, cooldown_secs: u64) -> PoolConfig {
        PoolConfig {
            size,
            cooldown: Duration::from_secs(cooldown_secs),
        }
    }

    fn key(s: &str) -> SymbolKey {
        SymbolKey::try_new(s).unwrap()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn rejects_zero_size() {
        let err = RateLimitedPool::new(Arc::new(Echo), config(0, 1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "rate_limit",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn rejects_zero_cooldown() {
        let err = RateLimitedPool::new(Arc::new(Echo), config(2, 0)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "cooldown_secs",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn starts_with_all_tokens_queued() {
        let pool = RateLimitedPool::new(Arc::new(Echo), config(3, 1)).unwrap();
        let stats = pool.stats();
        assert_eq!(stats.capacity, 3);
        assert_eq!(stats.queued, 3);
        assert_eq!(stats.leased + stats.cooling_down + stats.in_flight, 0);
    }

    // -------------------------------------------------------------------------
    // Token lifecycle
    // -------------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn spent_token_returns_after_cooldown() {
        let pool = RateLimitedPool::new(Arc::new(Echo), config(1, 5)).unwrap();
        let ctx = RequestContext::new();

        let series = pool.call(&key("AAPL"), &ctx).await.unwrap();
        assert_eq!(series.meta.symbol, "AAPL");

        tokio::task::yield_now().await;
        let stats = pool.stats();
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.cooling_down, 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        let stats = pool.stats();
        assert_eq!(stats.queued, 1);
        assert_eq!(stats.cooling_down, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_call_still_cools_down() {
        let pool = RateLimitedPool::new(Arc::new(Missing), config(1, 2)).unwrap();
        let ctx = RequestContext::new();

        let err = pool.call(&key("NOPE"), &ctx).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref symbol } if symbol == "NOPE"));

        let started = Instant::now();
        pool.call(&key("NOPE"), &ctx).await.unwrap_err();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_waiter_gives_up() {
        let pool = RateLimitedPool::new(Arc::new(Echo), config(1, 60)).unwrap();
        pool.call(&key("AAPL"), &RequestContext::new())
            .await
            .unwrap();

        let ctx = RequestContext::new();
        let waiter = {
            let pool = pool.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { pool.call(&key("MSFT"), &ctx).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        ctx.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    // -------------------------------------------------------------------------
    // Drain
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn call_after_drain_is_rejected() {
        let pool = RateLimitedPool::new(Arc::new(Echo), config(2, 1)).unwrap();
        pool.drain().await;

        let err = pool
            .call(&key("AAPL"), &RequestContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ShuttingDown { component: "pool" }));
        assert_eq!(pool.stats().queued, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_does_not_wait_for_cooling_tokens() {
        let pool = RateLimitedPool::new(Arc::new(Echo), config(1, 3600)).unwrap();
        pool.call(&key("AAPL"), &RequestContext::new())
            .await
            .unwrap();

        let started = Instant::now();
        pool.drain().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
