//! Outbound adapters (driven side): implementations of outbound ports.

pub mod audit;
pub mod cache;
pub mod sqlite;
pub mod twelvedata;
