//! SQLite persistence adapter.
//!
//! Provides the SQLite-backed [`SymbolStore`](crate::port::SymbolStore)
//! using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteSymbolStore;
