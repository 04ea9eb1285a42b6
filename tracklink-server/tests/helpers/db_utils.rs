//! Store and configuration helpers for tests

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use tracklink_common::config::{Config, DeezerConfig, SpotifyConfig};
use tracklink_server::db;

/// In-memory store with the schema applied. Single connection, so every
/// operation sees the same database.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");
    db::init_schema(&pool).await.expect("schema should apply");
    pool
}

/// Configuration with placeholder credentials; the fakes never dial out
pub fn test_config() -> Config {
    Config {
        spotify: SpotifyConfig {
            api_base: "https://api.spotify.com".into(),
            auth_base: "https://accounts.spotify.com".into(),
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
        },
        deezer: DeezerConfig {
            api_base: "https://api.deezer.com".into(),
            app_id: "app-id".into(),
            app_secret: "app-secret".into(),
        },
        seal_key: [7u8; 32],
    }
}
