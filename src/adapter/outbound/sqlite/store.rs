//! SQLite symbol store implementation.
//!
//! Provides persistent storage for symbols using SQLite and Diesel ORM.
//! Exchanges and price history are stored as JSON columns on the symbol row.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::SymbolRow;
use crate::adapter::outbound::sqlite::database::schema::symbols;
use crate::domain::{Symbol, SymbolKey, SymbolUpdate};
use crate::error::{Error, Result};
use crate::port::SymbolStore;

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed symbol store.
pub struct SqliteSymbolStore {
    /// Database connection pool.
    pool: DbPool,
    closed: AtomicBool,
}

impl SqliteSymbolStore {
    /// Create a new SQLite symbol store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            closed: AtomicBool::new(false),
        }
    }

    fn conn(&self) -> Result<Conn> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Connection("symbol store is closed".into()));
        }
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn to_row(symbol: &Symbol) -> Result<SymbolRow> {
        Ok(SymbolRow {
            symbol: symbol.symbol.to_string(),
            name: symbol.name.clone(),
            kind: symbol.kind.clone(),
            currency: symbol.currency.clone(),
            currency_base: symbol.currency_base.clone(),
            currency_quote: symbol.currency_quote.clone(),
            exchanges: serde_json::to_string(&symbol.exchanges)
                .map_err(|e| Error::Parse(e.to_string()))?,
            price_values: serde_json::to_string(&symbol.values)
                .map_err(|e| Error::Parse(e.to_string()))?,
            updated_at: Utc::now().to_rfc3339(),
        })
    }

    fn from_row(row: SymbolRow) -> Result<Symbol> {
        let key = SymbolKey::try_new(&row.symbol)?;
        let mut symbol = Symbol::new(key);
        symbol.name = row.name;
        symbol.kind = row.kind;
        symbol.currency = row.currency;
        symbol.currency_base = row.currency_base;
        symbol.currency_quote = row.currency_quote;
        symbol.exchanges =
            serde_json::from_str(&row.exchanges).map_err(|e| Error::Parse(e.to_string()))?;
        symbol.values =
            serde_json::from_str(&row.price_values).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(symbol)
    }

    fn find(conn: &mut SqliteConnection, key: &SymbolKey) -> Result<Option<SymbolRow>> {
        symbols::table
            .find(key.as_str())
            .select(SymbolRow::as_select())
            .first(conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }
}

#[async_trait]
impl SymbolStore for SqliteSymbolStore {
    async fn get(&self, key: &SymbolKey) -> Result<Option<Symbol>> {
        let mut conn = self.conn()?;
        Self::find(&mut conn, key)?.map(Self::from_row).transpose()
    }

    async fn persist(&self, symbol: &Symbol) -> Result<()> {
        symbol.validate()?;
        let row = Self::to_row(symbol)?;
        let mut conn = self.conn()?;

        diesel::replace_into(symbols::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        debug!(symbol = %symbol.symbol, "Symbol persisted");
        Ok(())
    }

    async fn merge(&self, symbol: &Symbol) -> Result<()> {
        symbol.validate()?;
        let key = symbol.symbol.clone();
        let mut conn = self.conn()?;

        conn.transaction::<_, Error, _>(|conn| {
            let row = match Self::find(conn, &key)? {
                Some(row) => {
                    let mut stored = Self::from_row(row)?;
                    SymbolUpdate::from(symbol).apply(&mut stored);
                    stored.validate()?;
                    Self::to_row(&stored)?
                }
                None => Self::to_row(symbol)?,
            };
            diesel::replace_into(symbols::table)
                .values(&row)
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })?;

        debug!(symbol = %key, "Symbol merged");
        Ok(())
    }

    async fn update(&self, update: &SymbolUpdate) -> Result<()> {
        let key = update.key()?.clone();
        let mut conn = self.conn()?;

        conn.transaction::<_, Error, _>(|conn| {
            let Some(row) = Self::find(conn, &key)? else {
                return Err(Error::NotFound {
                    symbol: key.to_string(),
                });
            };
            let mut symbol = Self::from_row(row)?;
            update.apply(&mut symbol);
            symbol.validate()?;

            let row = Self::to_row(&symbol)?;
            diesel::update(symbols::table.find(key.as_str()))
                .set(&row)
                .execute(conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            Ok(())
        })?;

        debug!(symbol = %key, "Symbol updated");
        Ok(())
    }

    async fn delete(&self, key: &SymbolKey) -> Result<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(symbols::table.find(key.as_str()))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        if deleted == 0 {
            return Err(Error::NotFound {
                symbol: key.to_string(),
            });
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Symbol>> {
        let mut conn = self.conn()?;

        let rows: Vec<SymbolRow> = symbols::table
            .order(symbols::symbol.asc())
            .select(SymbolRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Symbol store closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::domain::{Exchange, PricePoint};
    use rust_decimal_macros::dec;

    fn store() -> SqliteSymbolStore {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        SqliteSymbolStore::new(pool)
    }

    fn key(s: &str) -> SymbolKey {
        SymbolKey::try_new(s).unwrap()
    }

    fn apple() -> Symbol {
        let mut symbol = Symbol::new(key("AAPL"));
        symbol.name = "Apple Inc".into();
        symbol.kind = "Common Stock".into();
        symbol.currency = "USD".into();
        symbol.exchanges.push(Exchange {
            name: "NASDAQ".into(),
            country: "United States".into(),
            timezone: "America/New_York".into(),
            mic_code: "XNGS".into(),
        });
        symbol.values.push(
            PricePoint::parse("2024-03-01", "179.55", "180.53", "177.38", "179.66", Some("73488997"))
                .unwrap(),
        );
        symbol
    }

    #[tokio::test]
    async fn persist_then_get_returns_same_symbol() {
        let store = store();
        store.persist(&apple()).await.unwrap();

        let loaded = store.get(&key("aapl")).await.unwrap().unwrap();
        assert_eq!(loaded, apple());
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = store();
        assert!(store.get(&key("MSFT")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persist_replaces_existing_row() {
        let store = store();
        store.persist(&apple()).await.unwrap();

        let mut renamed = apple();
        renamed.name = "Apple".into();
        store.persist(&renamed).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.get(&key("AAPL")).await.unwrap().unwrap().name, "Apple");
    }

    #[tokio::test]
    async fn merge_on_existing_symbol_keeps_price_history() {
        let store = store();
        store.merge(&apple()).await.unwrap();

        let mut next_day = Symbol::new(key("AAPL"));
        next_day.values.push(
            PricePoint::parse("2024-03-04", "176.15", "176.90", "173.79", "175.10", None).unwrap(),
        );
        store.merge(&next_day).await.unwrap();

        let loaded = store.get(&key("AAPL")).await.unwrap().unwrap();
        assert_eq!(loaded.values.len(), 2);
        assert_eq!(loaded.name, "Apple Inc");
        assert_eq!(loaded.exchanges.len(), 1);
        assert_eq!(loaded.latest().unwrap().close, dec!(175.10));
    }

    #[tokio::test]
    async fn merge_overwrites_observation_for_same_date() {
        let store = store();
        store.merge(&apple()).await.unwrap();

        let mut corrected = Symbol::new(key("AAPL"));
        corrected.name = "Apple Inc.".into();
        corrected.values.push(
            PricePoint::parse("2024-03-01", "179.55", "180.53", "177.38", "180.00", None).unwrap(),
        );
        store.merge(&corrected).await.unwrap();

        let loaded = store.get(&key("AAPL")).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Apple Inc.");
        assert_eq!(loaded.values.len(), 1);
        assert_eq!(loaded.values[0].close, dec!(180.00));
    }

    #[tokio::test]
    async fn update_merges_prices_and_fields() {
        let store = store();
        store.persist(&apple()).await.unwrap();

        let mut update = SymbolUpdate::new(key("AAPL"));
        update.currency = Some("EUR".into());
        update.values.push(
            PricePoint::parse("2024-03-04", "176.15", "176.90", "173.79", "175.10", None).unwrap(),
        );
        store.update(&update).await.unwrap();

        let loaded = store.get(&key("AAPL")).await.unwrap().unwrap();
        assert_eq!(loaded.currency, "EUR");
        assert_eq!(loaded.name, "Apple Inc");
        assert_eq!(loaded.values.len(), 2);
        assert_eq!(loaded.latest().unwrap().close, dec!(175.10));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = store();
        let err = store
            .update(&SymbolUpdate::new(key("MSFT")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let store = store();
        store.persist(&apple()).await.unwrap();

        store.delete(&key("AAPL")).await.unwrap();
        assert!(store.get(&key("AAPL")).await.unwrap().is_none());

        let err = store.delete(&key("AAPL")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_is_ordered_by_key() {
        let store = store();
        store.persist(&Symbol::new(key("MSFT"))).await.unwrap();
        store.persist(&apple()).await.unwrap();

        let keys: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.symbol.to_string())
            .collect();
        assert_eq!(keys, vec!["AAPL", "MSFT"]);
    }

    #[tokio::test]
    async fn closed_store_rejects_calls() {
        let store = store();
        store.close().await.unwrap();
        store.close().await.unwrap();

        let err = store.get(&key("AAPL")).await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
