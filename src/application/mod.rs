//! Application layer: the rate-limited fetch-through pipeline.
//!
//! - [`pool`]: token-gated access to the market-data origin
//! - [`resolver`]: cache, store, origin resolution and audited mutations
//! - [`audit`]: fire-and-forget audit dispatch
//! - [`shutdown`]: deadline-bounded draining
//! - [`drain`]: the in-flight barrier shared by pool and dispatcher

pub mod audit;
pub mod drain;
pub mod mapper;
pub mod pool;
pub mod resolver;
pub mod shutdown;

pub use audit::{AuditDispatcher, AuditTransport};
pub use drain::{DrainBarrier, DrainGuard};
pub use pool::{Lease, PoolConfig, PoolStats, RateLimitedPool};
pub use resolver::FetchThroughResolver;
pub use shutdown::{ShutdownCoordinator, ShutdownState};
