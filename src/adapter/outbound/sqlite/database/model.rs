//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::symbols;

/// Database row for a symbol. Exchanges and prices are JSON arrays.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = symbols)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SymbolRow {
    pub symbol: String,
    pub name: String,
    pub kind: String,
    pub currency: String,
    pub currency_base: String,
    pub currency_quote: String,
    pub exchanges: String,
    pub price_values: String,
    pub updated_at: String,
}
