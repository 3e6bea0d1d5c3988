//! TTL cache backed by [`DashMap`].
//!
//! Entries expire a fixed time after they were written. Expired entries are
//! evicted lazily on read and by [`MemoryCache::purge_expired`].

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::trace;

use crate::domain::{Symbol, SymbolKey};
use crate::port::SymbolCache;

#[derive(Debug, Clone)]
struct CacheEntry {
    symbol: Symbol,
    expires_at: Instant,
}

/// Concurrent expiring cache of resolved symbols.
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<SymbolKey, CacheEntry>,
    ttl: Duration,
}

impl MemoryCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = entry.expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SymbolCache for MemoryCache {
    async fn get(&self, key: &SymbolKey) -> Option<Symbol> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.symbol.clone());
            }
        }
        if self
            .entries
            .remove_if(key, |_, entry| entry.expires_at <= now)
            .is_some()
        {
            trace!(symbol = %key, "Cache entry expired");
        }
        None
    }

    async fn set(&self, key: &SymbolKey, symbol: &Symbol) {
        self.entries.insert(
            key.clone(),
            CacheEntry {
                symbol: symbol.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    async fn delete(&self, key: &SymbolKey) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SymbolKey {
        SymbolKey::try_new(s).unwrap()
    }

    #[tokio::test]
    async fn set_then_get_returns_copy() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        let symbol = Symbol::new(key("AAPL"));
        cache.set(&key("AAPL"), &symbol).await;

        assert_eq!(cache.get(&key("AAPL")).await, Some(symbol));
        assert_eq!(cache.get(&key("MSFT")).await, None);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache.set(&key("AAPL"), &Symbol::new(key("AAPL"))).await;
        cache.delete(&key("AAPL")).await;
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new(Duration::from_secs(10));
        cache.set(&key("AAPL"), &Symbol::new(key("AAPL"))).await;

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.get(&key("AAPL")).await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&key("AAPL")).await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired() {
        let cache = MemoryCache::new(Duration::from_secs(10));
        cache.set(&key("AAPL"), &Symbol::new(key("AAPL"))).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.set(&key("MSFT"), &Symbol::new(key("MSFT"))).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn purge_counts_removals_while_writers_insert() {
        let cache = std::sync::Arc::new(MemoryCache::new(Duration::ZERO));
        let writer = {
            let cache = std::sync::Arc::clone(&cache);
            tokio::spawn(async move {
                for i in 0..2000 {
                    let key = key(&format!("S{i}"));
                    cache.set(&key, &Symbol::new(key.clone())).await;
                }
            })
        };

        let mut removed = 0;
        while !writer.is_finished() {
            removed += cache.purge_expired();
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
        removed += cache.purge_expired();

        assert_eq!(removed, 2000);
        assert!(cache.is_empty());
    }
}
