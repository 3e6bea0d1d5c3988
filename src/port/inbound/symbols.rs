//! Symbol use cases exposed to the CLI and any future HTTP layer.

use async_trait::async_trait;

use crate::domain::{RequestContext, Symbol, SymbolKey, SymbolUpdate};
use crate::error::Result;

#[async_trait]
pub trait SymbolService: Send + Sync {
    /// Resolve a symbol through cache, store and origin.
    async fn resolve(&self, key: &SymbolKey, ctx: &RequestContext) -> Result<Symbol>;

    /// Store a caller-supplied symbol.
    async fn add(&self, symbol: &Symbol, ctx: &RequestContext) -> Result<()>;

    /// Partially update a stored symbol.
    async fn update(&self, update: &SymbolUpdate, ctx: &RequestContext) -> Result<()>;

    /// Remove a stored symbol.
    async fn delete(&self, key: &SymbolKey, ctx: &RequestContext) -> Result<()>;

    /// All stored symbols.
    async fn list(&self) -> Result<Vec<Symbol>>;
}
