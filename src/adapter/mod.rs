//! Adapters implementing the ports.
//!
//! - [`outbound`]: SQLite store, Twelve Data origin, TTL cache, audit transports
//!
//! The only inbound driver is the CLI in [`crate::cli`].

pub mod outbound;
