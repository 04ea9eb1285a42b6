//! tracklink-server library - cross-catalog track equivalence service
//!
//! Accepts a shared track or playlist link from one streaming catalog and
//! answers with the equivalent track(s) on the other, over plain HTTP and
//! over a WebSocket session protocol. Matching is a best-effort title+artist
//! search, not a canonical cross-reference.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracklink_common::config::Config;
use tracklink_common::models::Catalog;
use tracklink_common::Result;

pub mod api;
pub mod cache;
pub mod catalogs;
pub mod db;
pub mod extract;
pub mod resolver;
pub mod session;
pub mod users;

use cache::TrackCache;
use catalogs::{CatalogAdapter, DeezerClient, SpotifyClient};

/// Application state shared across HTTP handlers and session tasks.
///
/// Holds the store pool and one adapter per catalog; constructed once in
/// `main` and injected everywhere. Nothing in the crate reaches for globals.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
    spotify: Arc<dyn CatalogAdapter>,
    deezer: Arc<dyn CatalogAdapter>,
}

impl AppState {
    /// Create application state with real catalog clients
    pub fn new(db: SqlitePool, config: Config) -> Result<Self> {
        let spotify = Arc::new(SpotifyClient::new(config.spotify.clone())?);
        let deezer = Arc::new(DeezerClient::new(config.deezer.clone())?);
        Ok(Self {
            db,
            config: Arc::new(config),
            spotify,
            deezer,
        })
    }

    /// Create application state with injected adapters (tests)
    pub fn with_adapters(
        db: SqlitePool,
        config: Config,
        spotify: Arc<dyn CatalogAdapter>,
        deezer: Arc<dyn CatalogAdapter>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            spotify,
            deezer,
        }
    }

    /// Adapter for one catalog
    pub fn adapter(&self, catalog: Catalog) -> &dyn CatalogAdapter {
        match catalog {
            Catalog::Spotify => self.spotify.as_ref(),
            Catalog::Deezer => self.deezer.as_ref(),
        }
    }

    /// Metadata cache over the shared store pool
    pub fn cache(&self) -> TrackCache {
        TrackCache::new(self.db.clone())
    }

    /// Resolver wired to this state's adapters and cache
    pub fn resolver(&self) -> resolver::Resolver {
        resolver::Resolver::new(self.spotify.clone(), self.deezer.clone(), self.cache())
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(api::search::search_track))
        .route("/zoovify/playlist", get(api::playlist::convert_playlist))
        .route("/ws", get(session::ws_handler))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
