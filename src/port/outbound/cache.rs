//! Cache port for resolved symbols.

use async_trait::async_trait;

use crate::domain::{Symbol, SymbolKey};

/// Best-effort, expiring key/value cache.
///
/// Cache operations cannot fail from the caller's point of view: a broken
/// cache behaves like an empty one.
#[async_trait]
pub trait SymbolCache: Send + Sync {
    async fn get(&self, key: &SymbolKey) -> Option<Symbol>;

    async fn set(&self, key: &SymbolKey, symbol: &Symbol);

    async fn delete(&self, key: &SymbolKey);
}
