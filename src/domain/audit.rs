//! Audit trail events.
//!
//! Events are immutable values built at the call site and handed to the
//! audit dispatcher, which delivers each one at most once.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    SignedUp,
    SignedIn,
    Refreshed,
}

impl AuditAction {
    /// Stable lowercase name used in logs and transport payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::SignedUp => "signed_up",
            Self::SignedIn => "signed_in",
            Self::Refreshed => "refreshed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Symbol,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol => f.write_str("symbol"),
            Self::User => f.write_str("user"),
        }
    }
}

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub entity: EntityKind,
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    /// Request id of the call that produced the event; empty when unknown.
    pub correlation_id: String,
}

impl AuditEvent {
    /// Create an event stamped with the current time.
    pub fn new(
        action: AuditAction,
        entity: EntityKind,
        entity_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            action,
            entity,
            entity_id: entity_id.into(),
            timestamp: Utc::now(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Event about a market symbol.
    pub fn symbol(
        action: AuditAction,
        symbol: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self::new(action, EntityKind::Symbol, symbol, correlation_id)
    }

    /// Event about a user account (sign-up, sign-in, token refresh).
    pub fn user(
        action: AuditAction,
        user_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self::new(action, EntityKind::User, user_id, correlation_id)
    }
}
