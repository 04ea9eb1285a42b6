//! Spotify catalog adapter
//!
//! Read and search calls run under a client-credentials bearer token. The
//! token is cached behind a mutex and refreshed only near its expiry
//! horizon; playlist creation uses the caller's own user token instead.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use tracklink_common::config::SpotifyConfig;
use tracklink_common::models::{Catalog, Playlist, PlaylistOwner, Track};
use tracklink_common::{Error, Result};

use super::{build_http_client, get_with_retry, search_query, CatalogAdapter};

/// Refresh the app token this long before Spotify would expire it
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Adapter for the Spotify Web API
pub struct SpotifyClient {
    http: reqwest::Client,
    config: SpotifyConfig,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            config,
            token: Mutex::new(None),
        })
    }

    /// Current app bearer token, fetching a fresh one when the cached token
    /// is absent or within the expiry margin.
    async fn bearer_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let credentials = BASE64.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));
        let url = format!("{}/api/token", self.config.auth_base);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {credentials}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized(
                "spotify rejected the app credentials".to_string(),
            ));
        }

        let token: AuthTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "refreshed spotify app token");

        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let token = self.bearer_token().await?;
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized(
                "spotify rejected the bearer token".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            status if !status.is_success() => {
                Err(Error::Internal(format!("spotify answered {status}")))
            }
            _ => response.json().await.map_err(|e| Error::Parse(e.to_string())),
        }
    }
}

#[async_trait]
impl CatalogAdapter for SpotifyClient {
    fn catalog(&self) -> Catalog {
        Catalog::Spotify
    }

    async fn fetch_track(&self, id: &str) -> Result<Track> {
        let url = format!("{}/v1/tracks/{}", self.config.api_base, id);
        let wire: SpotifyTrack = get_with_retry(|| self.get_json(&url, &[])).await?;
        tracing::debug!(id, title = %wire.name, "fetched spotify track");
        Ok(track_from_wire(wire))
    }

    async fn fetch_playlist(&self, id: &str) -> Result<Playlist> {
        let url = format!("{}/v1/playlists/{}", self.config.api_base, id);
        let wire: SpotifyPlaylist = get_with_retry(|| self.get_json(&url, &[])).await?;
        Ok(playlist_from_wire(wire))
    }

    async fn search_track(&self, title: &str, artist: &str) -> Result<Track> {
        let url = format!("{}/v1/search", self.config.api_base);
        let q = search_query(title, artist);
        let wire: SpotifySearchResponse = get_with_retry(|| async {
            self.get_json(&url, &[("q", q.as_str()), ("type", "track")]).await
        })
        .await?;

        let first = wire.tracks.items.into_iter().next().ok_or(Error::NotFound)?;
        Ok(track_from_wire(first))
    }

    /// POST the new playlist, then POST its track uris. Runs under the
    /// user's own token; never retried.
    async fn create_playlist(
        &self,
        user_id: &str,
        token: &str,
        title: &str,
        track_ids: &[String],
    ) -> Result<()> {
        let url = format!("{}/v1/users/{}/playlists", self.config.api_base, user_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "name": title }))
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized(
                "spotify rejected the user token".to_string(),
            ));
        }
        let created: SpotifyPlaylistCreated = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let uris: Vec<String> = track_ids
            .iter()
            .map(|id| format!("spotify:track:{id}"))
            .collect();
        let url = format!("{}/v1/playlists/{}/tracks", self.config.api_base, created.id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .query(&[("uris", uris.join(","))])
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized(
                "spotify rejected the user token".to_string(),
            )),
            status if !status.is_success() => {
                Err(Error::Internal(format!("spotify answered {status}")))
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AuthTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    album: SpotifyAlbum,
    artists: Vec<SpotifyArtist>,
    duration_ms: u64,
    explicit: bool,
    external_urls: ExternalUrls,
    id: String,
    name: String,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    #[serde(default)]
    images: Vec<SpotifyImage>,
    name: String,
    #[serde(default)]
    release_date: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct SpotifySearchResponse {
    tracks: SpotifySearchTracks,
}

#[derive(Debug, Deserialize)]
struct SpotifySearchTracks {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyPlaylist {
    collaborative: bool,
    #[serde(default)]
    description: String,
    external_urls: ExternalUrls,
    #[serde(default)]
    images: Vec<SpotifyImage>,
    name: String,
    owner: SpotifyOwner,
    tracks: SpotifyPlaylistTracks,
}

#[derive(Debug, Deserialize)]
struct SpotifyOwner {
    #[serde(default)]
    display_name: String,
    id: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyPlaylistTracks {
    #[serde(default)]
    items: Vec<SpotifyPlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct SpotifyPlaylistItem {
    added_at: Option<String>,
    /// Null for tracks removed from the catalog after being added
    track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyPlaylistCreated {
    id: String,
}

fn track_from_wire(wire: SpotifyTrack) -> Track {
    Track {
        title: wire.name,
        duration_ms: wire.duration_ms,
        artists: wire.artists.into_iter().map(|a| a.name).collect(),
        url: wire.external_urls.spotify,
        preview: wire.preview_url.filter(|p| !p.is_empty()),
        cover: wire
            .album
            .images
            .first()
            .map(|i| i.url.clone())
            .unwrap_or_default(),
        release_date: wire.album.release_date,
        explicit: wire.explicit,
        catalog: Catalog::Spotify,
        id: wire.id,
        played_at: None,
        added_at: None,
        album: wire.album.name,
    }
}

fn playlist_from_wire(wire: SpotifyPlaylist) -> Playlist {
    let tracks: Vec<Track> = wire
        .tracks
        .items
        .into_iter()
        .filter_map(|item| {
            let track = item.track?;
            let mut track = track_from_wire(track);
            track.added_at = item.added_at;
            Some(track)
        })
        .collect();
    let duration_ms = tracks.iter().map(|t| t.duration_ms).sum();
    let track_count = tracks.len() as u32;

    Playlist {
        title: wire.name,
        description: wire.description,
        duration_ms,
        collaborative: wire.collaborative,
        track_count,
        owner: PlaylistOwner {
            name: wire.owner.display_name,
            id: wire.owner.id,
            avatar: wire
                .owner
                .images
                .first()
                .map(|i| i.url.clone())
                .unwrap_or_default(),
        },
        tracks,
        url: wire.external_urls.spotify,
        cover: wire
            .images
            .first()
            .map(|i| i.url.clone())
            .unwrap_or_default(),
    }
}
