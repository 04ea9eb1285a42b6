//! Deezer catalog adapter
//!
//! Deezer's read endpoints are unauthenticated. Quirks handled here:
//! misses come back as a 200 with an embedded `{"error":...}` object,
//! durations arrive in seconds, and search results carry no release date.

use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use tracklink_common::config::DeezerConfig;
use tracklink_common::models::{Catalog, Playlist, PlaylistOwner, Track};
use tracklink_common::{Error, Result};

use super::{build_http_client, get_with_retry, search_query, CatalogAdapter};

/// Adapter for the Deezer API
pub struct DeezerClient {
    http: reqwest::Client,
    config: DeezerConfig,
}

impl DeezerClient {
    pub fn new(config: DeezerConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            config,
        })
    }

    /// GET a Deezer endpoint and decode the body, mapping embedded error
    /// objects to the error taxonomy.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Some(err) = embedded_error(&body) {
            return Err(err);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized("deezer rejected the request".to_string()));
        }
        if !status.is_success() {
            return Err(Error::Internal(format!("deezer answered {status}")));
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogAdapter for DeezerClient {
    fn catalog(&self) -> Catalog {
        Catalog::Deezer
    }

    async fn fetch_track(&self, id: &str) -> Result<Track> {
        let url = format!("{}/track/{}", self.config.api_base, id);
        let wire: DeezerTrack = get_with_retry(|| self.get_json(&url, &[])).await?;
        tracing::debug!(id, title = %wire.title, "fetched deezer track");
        Ok(track_from_wire(wire))
    }

    async fn fetch_playlist(&self, id: &str) -> Result<Playlist> {
        let url = format!("{}/playlist/{}", self.config.api_base, id);
        let wire: DeezerPlaylist = get_with_retry(|| self.get_json(&url, &[])).await?;
        Ok(playlist_from_wire(wire))
    }

    async fn search_track(&self, title: &str, artist: &str) -> Result<Track> {
        let url = format!("{}/search", self.config.api_base);
        let q = search_query(title, artist);
        let wire: DeezerSearchResponse =
            get_with_retry(|| async { self.get_json(&url, &[("q", q.as_str())]).await }).await?;

        let first = wire.data.into_iter().next().ok_or(Error::NotFound)?;
        Ok(track_from_wire(first))
    }

    /// Deezer's playlist creation is a GET-style RPC: one call creates the
    /// playlist, a second fills it and answers a bare `true` body.
    async fn create_playlist(
        &self,
        user_id: &str,
        token: &str,
        title: &str,
        track_ids: &[String],
    ) -> Result<()> {
        let url = format!("{}/user/{}/playlists", self.config.api_base, user_id);
        let created: DeezerPlaylistCreated = self
            .get_json(
                &url,
                &[
                    ("access_token", token),
                    ("request_method", "post"),
                    ("title", title),
                ],
            )
            .await?;

        let songs = track_ids.join(",");
        let url = format!("{}/playlist/{}/tracks", self.config.api_base, created.id);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("access_token", token),
                ("request_method", "post"),
                ("songs", songs.as_str()),
            ])
            .send()
            .await?;
        let body = response.text().await?;

        if let Some(err) = embedded_error(&body) {
            return Err(err);
        }
        if body.trim() == "true" {
            Ok(())
        } else {
            Err(Error::Parse(format!(
                "unexpected playlist-fill response: {body}"
            )))
        }
    }
}

/// Deezer reports misses (and auth failures) inside a 200 body
fn embedded_error(body: &str) -> Option<Error> {
    if !body.contains("{\"error\"") {
        return None;
    }
    if body.contains("OAuthException") {
        Some(Error::Unauthorized("deezer token rejected".to_string()))
    } else {
        Some(Error::NotFound)
    }
}

// ============================================================================
// Wire types
// ============================================================================
//
// One track shape covers the read-by-id, search and playlist-item variants;
// fields absent from a variant are optional or defaulted.

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    id: i64,
    title: String,
    link: String,
    /// Seconds; canonical model wants milliseconds
    duration: u64,
    release_date: Option<String>,
    explicit_lyrics: bool,
    preview: Option<String>,
    /// Unix seconds; playlist items only
    time_add: Option<i64>,
    #[serde(default)]
    contributors: Vec<DeezerArtist>,
    artist: DeezerArtist,
    album: DeezerAlbum,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbum {
    title: Option<String>,
    cover: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeezerSearchResponse {
    #[serde(default)]
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Deserialize)]
struct DeezerPlaylist {
    id: i64,
    title: String,
    #[serde(default)]
    description: String,
    collaborative: bool,
    nb_tracks: u32,
    link: String,
    picture: Option<String>,
    creator: DeezerCreator,
    tracks: DeezerPlaylistTracks,
}

#[derive(Debug, Deserialize)]
struct DeezerCreator {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeezerPlaylistTracks {
    #[serde(default)]
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Deserialize)]
struct DeezerPlaylistCreated {
    id: i64,
}

fn track_from_wire(wire: DeezerTrack) -> Track {
    let artists = if wire.contributors.is_empty() {
        vec![wire.artist.name]
    } else {
        wire.contributors.into_iter().map(|c| c.name).collect()
    };

    Track {
        title: wire.title,
        duration_ms: wire.duration * 1000,
        artists,
        url: wire.link,
        preview: wire.preview.filter(|p| !p.is_empty()),
        cover: wire.album.cover.unwrap_or_default(),
        release_date: wire.release_date.unwrap_or_default(),
        explicit: wire.explicit_lyrics,
        catalog: Catalog::Deezer,
        id: wire.id.to_string(),
        played_at: None,
        added_at: wire.time_add.and_then(format_unix_seconds),
        album: wire.album.title.unwrap_or_default(),
    }
}

fn playlist_from_wire(wire: DeezerPlaylist) -> Playlist {
    let cover = wire.picture.unwrap_or_default();
    let tracks: Vec<Track> = wire.tracks.data.into_iter().map(track_from_wire).collect();
    let duration_ms = tracks.iter().map(|t| t.duration_ms).sum();

    Playlist {
        title: wire.title,
        description: wire.description,
        duration_ms,
        collaborative: wire.collaborative,
        track_count: wire.nb_tracks,
        owner: PlaylistOwner {
            name: wire.creator.name,
            id: wire.creator.id.to_string(),
            avatar: cover.clone(),
        },
        tracks,
        url: wire.link,
        cover,
    }
}

fn format_unix_seconds(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
}
