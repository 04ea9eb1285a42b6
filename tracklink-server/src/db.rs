//! SQLite store bootstrap
//!
//! One pooled connection set backs the metadata cache, the search counter
//! and the stored-user lookup. Callers check a connection out per operation
//! through the pool; sqlx returns it on every path.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use tracklink_common::Result;

/// Open (creating if missing) the store and ensure the schema exists
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    info!("Store ready at {}", path.display());
    Ok(pool)
}

/// Create the backing tables when absent
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS track_cache (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS counters (
            name  TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            platform_id TEXT PRIMARY KEY,
            platform    TEXT NOT NULL,
            token       TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
