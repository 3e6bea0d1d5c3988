//! In-flight tracking with a closable gate.
//!
//! A [`DrainBarrier`] counts operations between `enter` and the drop of the
//! returned [`DrainGuard`]. Once [`DrainBarrier::drain`] has been called no
//! new operation can enter, and `drain` resolves when the count is zero.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

struct Inner {
    in_flight: AtomicUsize,
    closed: AtomicBool,
    idle: Notify,
}

impl Inner {
    fn exit(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Shared in-flight counter. Clones observe the same state.
#[derive(Clone)]
pub struct DrainBarrier {
    inner: Arc<Inner>,
}

impl DrainBarrier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                in_flight: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                idle: Notify::new(),
            }),
        }
    }

    /// Register one operation. `None` once draining has begun.
    #[must_use]
    pub fn enter(&self) -> Option<DrainGuard> {
        if self.is_closed() {
            return None;
        }
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        // drain() may have closed the gate between the check and the increment
        if self.is_closed() {
            self.inner.exit();
            return None;
        }
        Some(DrainGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Close the gate and wait until every entered operation has exited.
    ///
    /// Safe to call more than once and from several tasks.
    pub async fn drain(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }
}

impl Default for DrainBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DrainBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrainBarrier")
            .field("in_flight", &self.in_flight())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Marks one in-flight operation; exits the barrier on drop.
///
/// Dropping during unwinding also counts as an exit, so a panicking
/// operation never wedges a drain.
#[must_use = "the operation is only tracked while the guard is alive"]
pub struct DrainGuard {
    inner: Arc<Inner>,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        self.inner.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn drain_on_idle_barrier_returns_immediately() {
        let barrier = DrainBarrier::new();
        barrier.drain().await;
        assert!(barrier.is_closed());
    }

    #[tokio::test]
    async fn enter_after_drain_is_rejected() {
        let barrier = DrainBarrier::new();
        barrier.drain().await;
        assert!(barrier.enter().is_none());
        assert_eq!(barrier.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_outstanding_guards() {
        let barrier = DrainBarrier::new();
        let guard = barrier.enter().unwrap();
        assert_eq!(barrier.in_flight(), 1);

        let holder = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(guard);
        });

        let started = tokio::time::Instant::now();
        barrier.drain().await;
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(barrier.in_flight(), 0);
        holder.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_drains_all_complete() {
        let barrier = DrainBarrier::new();
        let guard = barrier.enter().unwrap();

        let a = tokio::spawn({
            let b = barrier.clone();
            async move { b.drain().await }
        });
        let b = tokio::spawn({
            let b = barrier.clone();
            async move { b.drain().await }
        });
        tokio::task::yield_now().await;
        drop(guard);

        a.await.unwrap();
        b.await.unwrap();
    }

    #[test]
    fn guard_released_on_panic() {
        let barrier = DrainBarrier::new();
        let cloned = barrier.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = cloned.enter().unwrap();
            panic!("operation failed");
        }));
        assert!(result.is_err());
        assert_eq!(barrier.in_flight(), 0);
    }
}
