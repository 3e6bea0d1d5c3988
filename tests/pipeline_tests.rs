//! End-to-end flow through the wired pipeline: SQLite store, spool audit
//! queue and a scripted origin standing in for Twelve Data.

use std::fs;
use std::sync::Arc;

use finance_api::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use finance_api::adapter::outbound::sqlite::SqliteSymbolStore;
use finance_api::application::ShutdownState;
use finance_api::domain::{AuditEvent, RequestContext};
use finance_api::error::Error;
use finance_api::infrastructure::bootstrap::{assemble, Pipeline};
use finance_api::port::SymbolStore;
use finance_api::testkit;
use finance_api::testkit::origin::ScriptedOrigin;
use tempfile::TempDir;

struct Flow {
    dir: TempDir,
    pipeline: Pipeline,
    store: Arc<SqliteSymbolStore>,
    origin: Arc<ScriptedOrigin>,
}

async fn flow() -> Flow {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("symbols.db").display().to_string();
    let mut config = testkit::config::app(&database);
    config.audit.queue_enabled = true;
    config.audit.spool_dir = dir.path().join("spool").display().to_string();

    let db = create_pool(&database).unwrap();
    run_migrations(&db).unwrap();
    let store = Arc::new(SqliteSymbolStore::new(db));
    let origin = ScriptedOrigin::new().into_arc();

    let pipeline = assemble(&config, store.clone(), origin.clone())
        .await
        .unwrap();
    Flow {
        dir,
        pipeline,
        store,
        origin,
    }
}

fn spooled_events(dir: &TempDir) -> Vec<AuditEvent> {
    let content = fs::read_to_string(dir.path().join("spool").join("audit.jsonl")).unwrap();
    content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn fetched_symbol_is_written_back_to_sqlite() {
    let f = flow().await;
    let key = testkit::domain::key("AAPL");
    let ctx = RequestContext::new();

    let fetched = f.pipeline.symbols.resolve(&key, &ctx).await.unwrap();
    let stored = f.store.get(&key).await.unwrap().expect("written back");
    assert_eq!(stored, fetched);

    let again = f.pipeline.symbols.resolve(&key, &ctx).await.unwrap();
    assert_eq!(again, fetched);
    assert_eq!(f.origin.calls(), 1);

    assert_eq!(f.pipeline.shutdown.shutdown().await, ShutdownState::Closed);
}

#[tokio::test]
async fn mutations_are_spooled_and_flushed_on_shutdown() {
    let f = flow().await;
    let ctx = RequestContext::with_request_id("cli-42");

    f.pipeline
        .symbols
        .add(&testkit::domain::symbol("MSFT"), &ctx)
        .await
        .unwrap();
    f.pipeline
        .symbols
        .delete(&testkit::domain::key("MSFT"), &ctx)
        .await
        .unwrap();

    let state = f.pipeline.shutdown.shutdown().await;
    assert_eq!(state, ShutdownState::Closed);

    let mut events: Vec<String> = spooled_events(&f.dir)
        .iter()
        .map(|e| format!("{}:{}:{}", e.action, e.entity_id, e.correlation_id))
        .collect();
    events.sort();
    assert_eq!(events, vec!["created:MSFT:cli-42", "deleted:MSFT:cli-42"]);
}

#[tokio::test]
async fn store_is_closed_after_clean_shutdown() {
    let f = flow().await;

    assert_eq!(f.pipeline.shutdown.shutdown().await, ShutdownState::Closed);

    let err = f.store.list().await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
    let err = f
        .pipeline
        .symbols
        .resolve(&testkit::domain::key("AAPL"), &RequestContext::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ShuttingDown { .. }));
    assert_eq!(f.origin.calls(), 0);
}
