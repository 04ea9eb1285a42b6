//! Metadata cache and search counter
//!
//! Get-or-populate cache keyed `"<catalog>-<id>"`, string-serialized Track
//! JSON values, no TTL. Two concurrent misses for one key may both fetch and
//! both write; last write wins, which is harmless because the canonical
//! Track for a given id is immutable upstream.

use sqlx::SqlitePool;
use tracing::debug;

use tracklink_common::models::{cache_key, Catalog, Track};
use tracklink_common::{Error, Result};

use crate::catalogs::CatalogAdapter;

/// Well-known counter name for operational search counting
pub const SEARCHES_COUNTER: &str = "searches";

/// Track metadata cache over the shared store pool
#[derive(Clone)]
pub struct TrackCache {
    db: SqlitePool,
}

impl TrackCache {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Cached track for `(catalog, id)`, if present
    pub async fn get(&self, catalog: Catalog, id: &str) -> Result<Option<Track>> {
        let key = cache_key(catalog, id);
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM track_cache WHERE key = ?")
            .bind(&key)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some((value,)) => {
                let track = serde_json::from_str(&value)
                    .map_err(|e| Error::Parse(format!("corrupt cache entry {key}: {e}")))?;
                Ok(Some(track))
            }
            None => Ok(None),
        }
    }

    /// Store a track under its `(catalog, id)` key, overwriting any entry
    pub async fn put(&self, track: &Track) -> Result<()> {
        let value = serde_json::to_string(track)
            .map_err(|e| Error::Internal(format!("track serialization: {e}")))?;
        sqlx::query("INSERT OR REPLACE INTO track_cache (key, value) VALUES (?, ?)")
            .bind(track.cache_key())
            .bind(value)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Look up `(catalog, id)`; on a miss, fetch through the adapter,
    /// store, and return the fetched track.
    pub async fn get_or_fetch(&self, adapter: &dyn CatalogAdapter, id: &str) -> Result<Track> {
        let catalog = adapter.catalog();
        if let Some(track) = self.get(catalog, id).await? {
            debug!(%catalog, id, "cache hit");
            return Ok(track);
        }

        debug!(%catalog, id, "cache miss, fetching from catalog");
        let track = adapter.fetch_track(id).await?;
        self.put(&track).await?;
        Ok(track)
    }

    /// Atomically bump the search counter, creating it at 1 when absent.
    /// Delegated to the store's own upsert arithmetic, not read-modify-write.
    pub async fn increment_searches(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "INSERT INTO counters (name, value) VALUES (?, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1
             RETURNING value",
        )
        .bind(SEARCHES_COUNTER)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    /// Current search counter value; 0 when the counter was never written
    pub async fn searches(&self) -> Result<i64> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT value FROM counters WHERE name = ?")
            .bind(SEARCHES_COUNTER)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|(v,)| v).unwrap_or(0))
    }
}
