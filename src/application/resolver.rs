//! Cache-aside resolution chain.
//!
//! ```text
//! resolve(key)
//!   ├─ cache hit  ─────────────────────────────▶ return
//!   ├─ store hit  ─────────────────────────────▶ return
//!   └─ miss ─▶ pool.call ─▶ map ─▶ store.persist ─▶ return
//! ```
//!
//! Populating the cache after a resolve is left to the calling layer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::application::audit::AuditDispatcher;
use crate::application::mapper::time_series_to_symbol;
use crate::application::pool::RateLimitedPool;
use crate::domain::{AuditAction, AuditEvent, RequestContext, Symbol, SymbolKey, SymbolUpdate};
use crate::error::{Error, Result};
use crate::port::{SymbolCache, SymbolService, SymbolStore};

/// Resolves symbols through cache, store and the rate-limited origin, and
/// applies audited mutations.
pub struct FetchThroughResolver {
    cache: Arc<dyn SymbolCache>,
    store: Arc<dyn SymbolStore>,
    pool: RateLimitedPool,
    audit: AuditDispatcher,
}

impl FetchThroughResolver {
    #[must_use]
    pub fn new(
        cache: Arc<dyn SymbolCache>,
        store: Arc<dyn SymbolStore>,
        pool: RateLimitedPool,
        audit: AuditDispatcher,
    ) -> Self {
        Self {
            cache,
            store,
            pool,
            audit,
        }
    }

    async fn fetch_and_persist(&self, key: &SymbolKey, ctx: &RequestContext) -> Result<Symbol> {
        let series = self.pool.call(key, ctx).await?;
        let symbol = time_series_to_symbol(key, &series)?;

        if let Err(e) = self.store.persist(&symbol).await {
            warn!(symbol = %key, error = %e, "Failed to persist fetched symbol");
            return Err(Error::PersistenceFailed {
                symbol: key.to_string(),
                source: Box::new(e),
            });
        }

        info!(
            symbol = %key,
            observations = symbol.values.len(),
            request_id = ctx.request_id(),
            "Fetched symbol from origin"
        );
        Ok(symbol)
    }
}

#[async_trait]
impl SymbolService for FetchThroughResolver {
    async fn resolve(&self, key: &SymbolKey, ctx: &RequestContext) -> Result<Symbol> {
        if let Some(symbol) = self.cache.get(key).await {
            debug!(symbol = %key, "Cache hit");
            return Ok(symbol);
        }

        match self.store.get(key).await {
            Ok(Some(symbol)) => {
                debug!(symbol = %key, "Store hit");
                return Ok(symbol);
            }
            Ok(None) => debug!(symbol = %key, "Store miss"),
            // A broken store must not take lookups down with it.
            Err(e) => warn!(symbol = %key, error = %e, "Store lookup failed, asking origin"),
        }

        self.fetch_and_persist(key, ctx).await
    }

    async fn add(&self, symbol: &Symbol, ctx: &RequestContext) -> Result<()> {
        symbol.validate()?;
        self.audit.record(AuditEvent::symbol(
            AuditAction::Created,
            symbol.key().as_str(),
            ctx.request_id(),
        ));
        let outcome = self.store.merge(symbol).await;
        self.cache.delete(symbol.key()).await;
        outcome
    }

    async fn update(&self, update: &SymbolUpdate, ctx: &RequestContext) -> Result<()> {
        let key = update.key()?.clone();
        self.audit.record(AuditEvent::symbol(
            AuditAction::Updated,
            key.as_str(),
            ctx.request_id(),
        ));
        let outcome = self.store.update(update).await;
        self.cache.delete(&key).await;
        outcome
    }

    async fn delete(&self, key: &SymbolKey, ctx: &RequestContext) -> Result<()> {
        self.audit.record(AuditEvent::symbol(
            AuditAction::Deleted,
            key.as_str(),
            ctx.request_id(),
        ));
        let outcome = self.store.delete(key).await;
        self.cache.delete(key).await;
        outcome
    }

    async fn list(&self) -> Result<Vec<Symbol>> {
        self.store.list().await
    }
}
