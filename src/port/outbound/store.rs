//! Store port for symbol persistence.

use async_trait::async_trait;

use crate::domain::{Symbol, SymbolKey, SymbolUpdate};
use crate::error::Result;

/// Durable storage of symbols and their price history.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `update` and `delete` return [`Error::NotFound`](crate::error::Error::NotFound)
///   when the key is absent
/// - `persist` overwrites the whole snapshot (origin write-back); `merge`
///   keeps stored history (user-supplied additions)
/// - After `close` every method fails with a connection error
#[async_trait]
pub trait SymbolStore: Send + Sync {
    /// Load a symbol by key. `Ok(None)` when absent.
    async fn get(&self, key: &SymbolKey) -> Result<Option<Symbol>>;

    /// Insert or replace a symbol.
    async fn persist(&self, symbol: &Symbol) -> Result<()>;

    /// Insert a symbol, or fold it into the stored one: non-empty
    /// descriptive fields replace, exchanges and prices are upserted.
    async fn merge(&self, symbol: &Symbol) -> Result<()>;

    /// Apply a partial update to an existing symbol.
    async fn update(&self, update: &SymbolUpdate) -> Result<()>;

    /// Remove a symbol.
    async fn delete(&self, key: &SymbolKey) -> Result<()>;

    /// All stored symbols, ordered by key.
    async fn list(&self) -> Result<Vec<Symbol>>;

    /// Release the underlying connections.
    async fn close(&self) -> Result<()>;
}
