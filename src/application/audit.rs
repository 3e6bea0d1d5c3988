//! Fire-and-forget audit dispatch.
//!
//! [`AuditDispatcher::record`] returns immediately; delivery runs on a
//! detached task that holds a drain guard, so shutdown can wait for every
//! accepted event. Each event is attempted once. Failures are logged as
//! [`Error::AuditDeliveryFailed`] and never reach the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::drain::DrainBarrier;
use crate::domain::AuditEvent;
use crate::error::{Error, Result};
use crate::port::{Ack, AuditClient, AuditQueue};

/// Which transport(s) carry audit events. Chosen once at configuration time.
#[derive(Clone)]
pub enum AuditTransport {
    /// Events are discarded.
    Disabled,
    /// Publish to a message-queue destination.
    Queue {
        queue: Arc<dyn AuditQueue>,
        destination: String,
    },
    /// Send to the remote logging service.
    Remote(Arc<dyn AuditClient>),
    /// Publish to the queue; only if that attempt fails, try the remote
    /// service.
    QueueWithRemoteFallback {
        queue: Arc<dyn AuditQueue>,
        destination: String,
        remote: Arc<dyn AuditClient>,
    },
}

impl AuditTransport {
    /// Pick the strategy matching the enabled transports.
    #[must_use]
    pub fn select(
        queue: Option<(Arc<dyn AuditQueue>, String)>,
        remote: Option<Arc<dyn AuditClient>>,
    ) -> Self {
        match (queue, remote) {
            (None, None) => Self::Disabled,
            (Some((queue, destination)), None) => Self::Queue { queue, destination },
            (None, Some(remote)) => Self::Remote(remote),
            (Some((queue, destination)), Some(remote)) => Self::QueueWithRemoteFallback {
                queue,
                destination,
                remote,
            },
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Queue { .. } => "queue",
            Self::Remote(_) => "remote",
            Self::QueueWithRemoteFallback { .. } => "queue+remote",
        }
    }

    async fn deliver(&self, event: &AuditEvent) -> Result<()> {
        match self {
            Self::Disabled => Ok(()),
            Self::Queue { queue, destination } => queue.publish(destination, event).await,
            Self::Remote(remote) => log_remote(remote.as_ref(), event).await,
            Self::QueueWithRemoteFallback {
                queue,
                destination,
                remote,
            } => match queue.publish(destination, event).await {
                Ok(()) => Ok(()),
                Err(queue_err) => {
                    warn!(
                        error = %queue_err,
                        destination = %destination,
                        "Audit queue publish failed, falling back to remote"
                    );
                    log_remote(remote.as_ref(), event).await.map_err(|remote_err| {
                        Error::AuditDeliveryFailed(format!(
                            "queue: {queue_err}; remote: {remote_err}"
                        ))
                    })
                }
            },
        }
    }

    async fn close(&self) {
        let (queue, remote) = match self {
            Self::Disabled => (None, None),
            Self::Queue { queue, .. } => (Some(queue), None),
            Self::Remote(remote) => (None, Some(remote)),
            Self::QueueWithRemoteFallback { queue, remote, .. } => (Some(queue), Some(remote)),
        };
        if let Some(queue) = queue {
            if let Err(e) = queue.close().await {
                error!(error = %e, "Failed to close audit queue");
            }
        }
        if let Some(remote) = remote {
            if let Err(e) = remote.close().await {
                error!(error = %e, "Failed to close audit client");
            }
        }
    }
}

impl std::fmt::Debug for AuditTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

async fn log_remote(client: &dyn AuditClient, event: &AuditEvent) -> Result<()> {
    match client.log(event).await? {
        Ack::Ok => Ok(()),
        Ack::Error => Err(Error::AuditDeliveryFailed(
            "remote audit service answered with an error ack".into(),
        )),
    }
}

struct DispatcherInner {
    transport: AuditTransport,
    barrier: DrainBarrier,
    closed: AtomicBool,
}

/// Non-blocking audit logger with a drain barrier.
///
/// Cheap to clone; clones share the barrier and transports.
#[derive(Clone, Debug)]
pub struct AuditDispatcher {
    inner: Arc<DispatcherInner>,
}

impl std::fmt::Debug for DispatcherInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditDispatcher")
            .field("transport", &self.transport)
            .field("barrier", &self.barrier)
            .finish()
    }
}

impl AuditDispatcher {
    #[must_use]
    pub fn new(transport: AuditTransport) -> Self {
        info!(transport = transport.name(), "Audit dispatcher ready");
        Self {
            inner: Arc::new(DispatcherInner {
                transport,
                barrier: DrainBarrier::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Hand an event over for delivery and return at once.
    ///
    /// Must be called from within a tokio runtime. Events recorded after
    /// [`drain`](Self::drain) has begun are dropped with a warning.
    pub fn record(&self, event: AuditEvent) {
        let Some(guard) = self.inner.barrier.enter() else {
            warn!(
                action = %event.action,
                entity = %event.entity,
                entity_id = %event.entity_id,
                "Audit dispatcher draining, event dropped"
            );
            return;
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _guard = guard;
            match inner.transport.deliver(&event).await {
                Ok(()) => debug!(
                    action = %event.action,
                    entity_id = %event.entity_id,
                    transport = inner.transport.name(),
                    "Audit event delivered"
                ),
                Err(e) => {
                    let failure = match e {
                        Error::AuditDeliveryFailed(_) => e,
                        other => Error::AuditDeliveryFailed(other.to_string()),
                    };
                    error!(
                        error = %failure,
                        action = %event.action,
                        entity_id = %event.entity_id,
                        correlation_id = %event.correlation_id,
                        "Audit event lost"
                    );
                }
            }
        });
    }

    /// Stop accepting events, wait for pending deliveries, then close the
    /// transports. Transports are closed exactly once however often this is
    /// called.
    pub async fn drain(&self) {
        self.inner.barrier.drain().await;
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            self.inner.transport.close().await;
            debug!("Audit dispatcher drained");
        }
    }

    /// Deliveries accepted but not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.barrier.in_flight()
    }
}
