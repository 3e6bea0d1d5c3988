//! Infrastructure bootstrap helpers for runtime wiring.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::audit::{HttpAuditClient, SpoolQueue};
use crate::adapter::outbound::cache::MemoryCache;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::SqliteSymbolStore;
use crate::adapter::outbound::twelvedata::{TwelveData, API_KEY_ENV};
use crate::application::{
    AuditDispatcher, AuditTransport, FetchThroughResolver, RateLimitedPool, ShutdownCoordinator,
};
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::{AuditClient, AuditQueue, OriginClient, SymbolCache, SymbolService, SymbolStore};

/// Fully wired pipeline.
pub struct Pipeline {
    pub symbols: Arc<dyn SymbolService>,
    pub cache: Arc<dyn SymbolCache>,
    pub pool: RateLimitedPool,
    pub audit: AuditDispatcher,
    pub shutdown: Arc<ShutdownCoordinator>,
}

/// Build the pipeline from configuration: SQLite store, Twelve Data origin,
/// in-memory cache and the configured audit transports.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated, or an
/// adapter rejects its configuration.
pub async fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let store = build_store(&config.database)?;
    let origin = build_origin(config)?;
    assemble(config, store, origin).await
}

/// Wire the pipeline around an existing store and origin.
///
/// # Errors
///
/// Returns an error if the pool configuration is invalid or an audit
/// transport cannot be opened.
pub async fn assemble(
    config: &Config,
    store: Arc<dyn SymbolStore>,
    origin: Arc<dyn OriginClient>,
) -> Result<Pipeline> {
    let cache: Arc<dyn SymbolCache> = Arc::new(MemoryCache::new(config.cache.symbol_ttl()));
    let pool = RateLimitedPool::new(origin, config.origin.pool())?;
    let audit = AuditDispatcher::new(build_audit_transport(config).await?);

    let symbols: Arc<dyn SymbolService> = Arc::new(FetchThroughResolver::new(
        Arc::clone(&cache),
        Arc::clone(&store),
        pool.clone(),
        audit.clone(),
    ));
    let shutdown = Arc::new(ShutdownCoordinator::new(
        pool.clone(),
        audit.clone(),
        store,
        config.shutdown.deadline(),
    ));

    Ok(Pipeline {
        symbols,
        cache,
        pool,
        audit,
        shutdown,
    })
}

/// Open the SQLite database and apply pending migrations.
pub(crate) fn build_store(database: &str) -> Result<Arc<dyn SymbolStore>> {
    if let Some(parent) = Path::new(database).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let pool = create_pool(database)?;
    run_migrations(&pool)?;
    info!(database = %database, "Database initialized");
    Ok(Arc::new(SqliteSymbolStore::new(pool)))
}

/// Twelve Data client. Without an API key the client is still built so that
/// store-only commands work; origin calls will then be rejected upstream.
fn build_origin(config: &Config) -> Result<Arc<dyn OriginClient>> {
    let client = match TwelveData::from_env(&config.origin.host, config.origin.timeout()) {
        Ok(client) => client,
        Err(Error::Config(ConfigError::MissingField { .. })) => {
            warn!(
                env = API_KEY_ENV,
                "API key not set, origin requests will be rejected"
            );
            TwelveData::new("", &config.origin.host, config.origin.timeout())?
        }
        Err(e) => return Err(e),
    };
    Ok(Arc::new(client))
}

async fn build_audit_transport(config: &Config) -> Result<AuditTransport> {
    let audit = &config.audit;

    let queue = if audit.queue_enabled {
        let spool: Arc<dyn AuditQueue> = Arc::new(SpoolQueue::open(&audit.spool_dir).await?);
        Some((spool, audit.queue_name.clone()))
    } else {
        None
    };

    let remote = match (audit.remote_enabled, audit.remote_url.as_deref()) {
        (true, Some(url)) => {
            let client: Arc<dyn AuditClient> =
                Arc::new(HttpAuditClient::new(url, audit.remote_timeout())?);
            Some(client)
        }
        (true, None) => {
            return Err(ConfigError::MissingField {
                field: "audit.remote_url",
            }
            .into())
        }
        (false, _) => None,
    };

    Ok(AuditTransport::select(queue, remote))
}
