//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`symbols`]: symbol lookup and mutation use cases

pub mod symbols;

pub use symbols::SymbolService;
