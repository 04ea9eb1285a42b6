//! Canonical track and playlist data model
//!
//! Every catalog adapter normalizes its native response shapes into these
//! types. Field names on the wire follow the established client contract
//! (`artistes`, `platform`, `playlist_url`, ...), so renames here are
//! deliberate and must not change without a protocol bump.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One external streaming catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Catalog {
    Spotify,
    Deezer,
}

impl Catalog {
    pub fn as_str(&self) -> &'static str {
        match self {
            Catalog::Spotify => "spotify",
            Catalog::Deezer => "deezer",
        }
    }

    /// The sibling catalog a track gets resolved against
    pub fn other(&self) -> Catalog {
        match self {
            Catalog::Spotify => Catalog::Deezer,
            Catalog::Deezer => Catalog::Spotify,
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Catalog {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spotify" => Ok(Catalog::Spotify),
            "deezer" => Ok(Catalog::Deezer),
            other => Err(Error::InvalidInput(format!("unknown catalog: {other}"))),
        }
    }
}

/// What kind of entity a shared link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Track,
    Playlist,
}

/// A single track, normalized across catalogs.
///
/// The `(catalog, id)` pair is the only stable cross-session identity.
/// Instances are value objects: never mutated after construction, except for
/// the deliberate release-date backfill applied by the equivalence resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Duration in milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Order-significant, first entry is the primary artist
    #[serde(rename = "artistes")]
    pub artists: Vec<String>,
    /// Canonical web url on the owning catalog
    pub url: String,
    /// Preview audio url, when the catalog offers one
    pub preview: Option<String>,
    /// Cover image url
    pub cover: String,
    /// Catalog-native date string; may be empty when the catalog omits it
    pub release_date: String,
    pub explicit: bool,
    #[serde(rename = "platform")]
    pub catalog: Catalog,
    /// Catalog-native id
    pub id: String,
    /// Listening-history context: when the track was played
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<String>,
    /// Playlist-membership context: when the track was added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    pub album: String,
}

impl Track {
    /// Key this track is stored under in the metadata cache
    pub fn cache_key(&self) -> String {
        cache_key(self.catalog, &self.id)
    }
}

/// Cache key format: `"<catalog>-<id>"`
pub fn cache_key(catalog: Catalog, id: &str) -> String {
    format!("{catalog}-{id}")
}

/// Owner block of a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub name: String,
    pub id: String,
    pub avatar: String,
}

/// A playlist, normalized across catalogs. Track order is catalog-native.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub title: String,
    pub description: String,
    /// Sum of track durations, milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    #[serde(rename = "public")]
    pub collaborative: bool,
    #[serde(rename = "tracks_number")]
    pub track_count: u32,
    pub owner: PlaylistOwner,
    pub tracks: Vec<Track>,
    #[serde(rename = "playlist_url")]
    pub url: String,
    #[serde(rename = "playlist_cover")]
    pub cover: String,
}

/// Canonical descriptor parsed out of a shared link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedInfo {
    pub catalog: Catalog,
    /// API-addressable url for the entity on its owning catalog
    pub api_url: String,
    /// Catalog-native entity id
    pub id: String,
    pub kind: EntityKind,
}
