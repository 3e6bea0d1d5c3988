//! finance-api - rate-limited fetch-through pipeline for market data.
//!
//! Lookups resolve through an in-process cache, a SQLite store and finally
//! the Twelve Data API. Every origin call is gated by a fixed set of
//! throttling tokens that return to circulation only after a cooldown, so the
//! provider's rate limit is never exceeded. Mutations are audited without
//! blocking the caller, and shutdown drains everything within one deadline.
//!
//! # Modules
//!
//! - [`domain`] - Symbols, price history, audit events, request context
//! - [`port`] - Traits for the store, cache, origin and audit transports
//! - [`application`] - Pool, resolver, audit dispatcher, shutdown coordinator
//! - [`adapter`] - SQLite, Twelve Data, TTL cache and audit transport adapters
//! - [`infrastructure`] - Configuration and wiring
//! - [`cli`] - Command-line driver
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use finance_api::domain::{RequestContext, SymbolKey};
//! use finance_api::infrastructure::bootstrap::build_pipeline;
//! use finance_api::infrastructure::config::Config;
//!
//! # async fn run() -> finance_api::error::Result<()> {
//! let pipeline = build_pipeline(&Config::load("config.toml")?).await?;
//! let key = SymbolKey::try_new("AAPL")?;
//! let symbol = pipeline.symbols.resolve(&key, &RequestContext::new()).await?;
//! println!("{} closes: {}", symbol.symbol, symbol.values.len());
//! pipeline.shutdown.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
