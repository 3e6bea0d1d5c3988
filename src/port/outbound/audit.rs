//! Audit transport ports.
//!
//! Two alternative transports exist: a unary remote logging service and a
//! message queue. Which one is used is decided by
//! `AuditTransport`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::AuditEvent;
use crate::error::Result;

/// Acknowledgement returned by the remote audit service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ack {
    Ok,
    Error,
}

/// Remote unary audit logger.
#[async_trait]
pub trait AuditClient: Send + Sync {
    /// Send one event. A transport failure is an `Err`; a service-side
    /// refusal is `Ok(Ack::Error)`.
    async fn log(&self, event: &AuditEvent) -> Result<Ack>;

    async fn close(&self) -> Result<()>;
}

/// Message-queue audit publisher.
#[async_trait]
pub trait AuditQueue: Send + Sync {
    /// Publish one event to the named destination.
    async fn publish(&self, destination: &str, event: &AuditEvent) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
