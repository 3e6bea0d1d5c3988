//! In-memory [`SymbolStore`] with failure injection.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Symbol, SymbolKey, SymbolUpdate};
use crate::error::{Error, Result};
use crate::port::SymbolStore;

/// Thread-safe map-backed store.
///
/// Individual operations can be switched to fail with
/// [`Error::Database`]; counters record how often each was attempted.
#[derive(Default)]
pub struct MemoryStore {
    symbols: RwLock<BTreeMap<SymbolKey, Symbol>>,
    fail_get: AtomicBool,
    fail_persist: AtomicBool,
    gets: AtomicUsize,
    persists: AtomicUsize,
    closes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `symbols`.
    pub fn with_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let store = Self::new();
        {
            let mut map = store.symbols.write();
            for symbol in symbols {
                map.insert(symbol.symbol.clone(), symbol);
            }
        }
        store
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Calls to `persist` and `merge`.
    pub fn persists(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &SymbolKey) -> bool {
        self.symbols.read().contains_key(key)
    }
}

#[async_trait]
impl SymbolStore for MemoryStore {
    async fn get(&self, key: &SymbolKey) -> Result<Option<Symbol>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Error::Database("injected get failure".into()));
        }
        Ok(self.symbols.read().get(key).cloned())
    }

    async fn persist(&self, symbol: &Symbol) -> Result<()> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(Error::Database("injected persist failure".into()));
        }
        symbol.validate()?;
        self.symbols
            .write()
            .insert(symbol.symbol.clone(), symbol.clone());
        Ok(())
    }

    async fn merge(&self, symbol: &Symbol) -> Result<()> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(Error::Database("injected persist failure".into()));
        }
        symbol.validate()?;
        let mut symbols = self.symbols.write();
        match symbols.get_mut(&symbol.symbol) {
            Some(stored) => SymbolUpdate::from(symbol).apply(stored),
            None => {
                symbols.insert(symbol.symbol.clone(), symbol.clone());
            }
        }
        Ok(())
    }

    async fn update(&self, update: &SymbolUpdate) -> Result<()> {
        let key = update.key()?;
        let mut symbols = self.symbols.write();
        let Some(symbol) = symbols.get_mut(key) else {
            return Err(Error::NotFound {
                symbol: key.to_string(),
            });
        };
        update.apply(symbol);
        Ok(())
    }

    async fn delete(&self, key: &SymbolKey) -> Result<()> {
        match self.symbols.write().remove(key) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound {
                symbol: key.to_string(),
            }),
        }
    }

    async fn list(&self) -> Result<Vec<Symbol>> {
        Ok(self.symbols.read().values().cloned().collect())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
