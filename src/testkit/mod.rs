//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`origin`] - `ScriptedOrigin`, an [`OriginClient`](crate::port::OriginClient)
//!   with scripted outcomes, latency and concurrency tracking.
//! - [`store`] - `MemoryStore`, an in-memory [`SymbolStore`](crate::port::SymbolStore)
//!   with failure injection.
//! - [`audit`] - Recording audit queue and client.
//! - [`domain`] - Builders for keys, symbols, time series and events.
//! - [`config`] - Canonical test configurations.

pub mod audit;
pub mod config;
pub mod domain;
pub mod origin;
pub mod store;
