//! In-memory catalog adapter fakes
//!
//! Deterministic stand-ins for the remote catalogs: fixture tracks keyed by
//! id, search hits keyed by cleaned title, and call counters so tests can
//! assert caching behavior.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tracklink_common::models::{Catalog, Playlist, PlaylistOwner, Track};
use tracklink_common::{Error, Result};
use tracklink_server::catalogs::{clean_title, CatalogAdapter};

/// Record of one create_playlist call
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlaylist {
    pub user_id: String,
    pub token: String,
    pub title: String,
    pub track_ids: Vec<String>,
}

pub struct FakeCatalog {
    catalog: Catalog,
    tracks: HashMap<String, Track>,
    search_hits: HashMap<String, Track>,
    playlists: HashMap<String, Playlist>,
    pub fetch_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub created: Mutex<Vec<CreatedPlaylist>>,
}

impl FakeCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            tracks: HashMap::new(),
            search_hits: HashMap::new(),
            playlists: HashMap::new(),
            fetch_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Register a track served by `fetch_track`
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.insert(track.id.clone(), track);
        self
    }

    /// Register the first (and only) search hit for a title
    pub fn with_search_hit(mut self, track: Track) -> Self {
        self.search_hits.insert(search_key(&track.title), track);
        self
    }

    /// Register a playlist served by `fetch_playlist`
    pub fn with_playlist(mut self, id: &str, playlist: Playlist) -> Self {
        self.playlists.insert(id.to_string(), playlist);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

/// Search hits are keyed the way the real adapters query: cleaned title
fn search_key(title: &str) -> String {
    clean_title(title).to_lowercase()
}

#[async_trait]
impl CatalogAdapter for FakeCatalog {
    fn catalog(&self) -> Catalog {
        self.catalog
    }

    async fn fetch_track(&self, id: &str) -> Result<Track> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.tracks.get(id).cloned().ok_or(Error::NotFound)
    }

    async fn fetch_playlist(&self, id: &str) -> Result<Playlist> {
        self.playlists.get(id).cloned().ok_or(Error::NotFound)
    }

    async fn search_track(&self, title: &str, _artist: &str) -> Result<Track> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_hits
            .get(&search_key(title))
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        token: &str,
        title: &str,
        track_ids: &[String],
    ) -> Result<()> {
        self.created.lock().unwrap().push(CreatedPlaylist {
            user_id: user_id.to_string(),
            token: token.to_string(),
            title: title.to_string(),
            track_ids: track_ids.to_vec(),
        });
        Ok(())
    }
}

/// Minimal canonical track fixture
pub fn track_fixture(
    catalog: Catalog,
    id: &str,
    title: &str,
    artist: &str,
    release_date: &str,
) -> Track {
    Track {
        title: title.to_string(),
        duration_ms: 224_000,
        artists: vec![artist.to_string()],
        url: format!("https://{catalog}.example/track/{id}"),
        preview: None,
        cover: format!("https://{catalog}.example/cover/{id}.jpg"),
        release_date: release_date.to_string(),
        explicit: false,
        catalog,
        id: id.to_string(),
        played_at: None,
        added_at: None,
        album: "Fixture Album".to_string(),
    }
}

/// Playlist fixture wrapping the given tracks
pub fn playlist_fixture(catalog: Catalog, id: &str, title: &str, tracks: Vec<Track>) -> Playlist {
    let duration_ms = tracks.iter().map(|t| t.duration_ms).sum();
    Playlist {
        title: title.to_string(),
        description: "fixture playlist".to_string(),
        duration_ms,
        collaborative: false,
        track_count: tracks.len() as u32,
        owner: PlaylistOwner {
            name: "fixture-owner".to_string(),
            id: "owner-1".to_string(),
            avatar: String::new(),
        },
        tracks,
        url: format!("https://{catalog}.example/playlist/{id}"),
        cover: String::new(),
    }
}
