//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!     CLI ──────────▶│  FetchThroughResolver   │
//!                    └───────────┬─────────────┘
//!          ┌──────────────┬──────┴───────┬──────────────┐
//!          ▼              ▼              ▼              ▼
//!     ┌─────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐
//!     │  Cache  │   │  Store   │   │  Origin  │   │   Audit   │
//!     └─────────┘   └──────────┘   └──────────┘   └───────────┘
//! ```
//!
//! - [`inbound`]: use cases exposed to drivers (CLI, HTTP layer)
//! - [`outbound`]: infrastructure the pipeline depends on

pub mod inbound;
pub mod outbound;

pub use inbound::SymbolService;
pub use outbound::{
    Ack, AuditClient, AuditQueue, OriginClient, SymbolCache, SymbolStore, TimeSeries,
    TimeSeriesMeta, TimeSeriesValue,
};
