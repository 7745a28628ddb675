//! Civicdesk persistence layer.
//!
//! The ticket store is the single source of truth; every mutating ticket
//! operation here runs in a scoped transaction that reads the current row,
//! validates the guard, and writes the new row plus any audit/message row,
//! or aborts with no partial write.

use sqlx::postgres::PgPoolOptions;

use civicdesk_core::error::CoreError;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Error from a guarded ticket operation: a domain guard failure or a
/// database failure. Guard failures abort the owning transaction.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap liveness probe used at startup and by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}
