//! Postgres pool construction and embedded migrations.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::DbError;

/// Embedded schema migrations.
///
/// Applied by ops tooling or tests (`MIGRATOR.run(&pool)`), never implicitly
/// at boot.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Build a pool that connects on first use.
///
/// The process starts (and the health endpoints answer) before the database
/// is reachable; the first query pays the connection cost.
pub fn connect_lazy(database_url: &str) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new().connect_lazy(database_url)?;
    Ok(pool)
}
