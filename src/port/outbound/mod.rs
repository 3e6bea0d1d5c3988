//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the market-data origin, persistence, caching and
//! the two audit transports.

pub mod audit;
pub mod cache;
pub mod origin;
pub mod store;

pub use audit::{Ack, AuditClient, AuditQueue};
pub use cache::SymbolCache;
pub use origin::{OriginClient, TimeSeries, TimeSeriesMeta, TimeSeriesValue};
pub use store::SymbolStore;
