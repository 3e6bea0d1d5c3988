//! Exchange-agnostic domain types: symbols, price history, audit events.
//!
//! Depends on nothing but serde, chrono and rust_decimal; every port and
//! adapter is expressed in these types.

pub mod audit;
pub mod context;
pub mod error;
pub mod id;
pub mod symbol;

pub use audit::{AuditAction, AuditEvent, EntityKind};
pub use context::RequestContext;
pub use error::DomainError;
pub use id::SymbolKey;
pub use symbol::{Exchange, PricePoint, Symbol, SymbolUpdate};
