//! Cross-catalog equivalence resolution
//!
//! Given a track's identity on one catalog, find its best-effort equivalent
//! on the other via title+primary-artist search. Works starting from either
//! catalog. A miss on one side degrades the result to a partial pair; it
//! never aborts the request.

use std::sync::Arc;

use tracing::{debug, warn};

use tracklink_common::models::{Catalog, ExtractedInfo, Playlist, Track};
use tracklink_common::Result;

use crate::cache::TrackCache;
use crate::catalogs::CatalogAdapter;

/// Positionally aligned resolution result: element i of each side is the
/// same logical song. Either side of a single-track pair may be empty.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPair {
    pub spotify: Vec<Track>,
    pub deezer: Vec<Track>,
}

/// Equivalence resolver over both catalog adapters and the metadata cache
pub struct Resolver {
    spotify: Arc<dyn CatalogAdapter>,
    deezer: Arc<dyn CatalogAdapter>,
    cache: TrackCache,
}

impl Resolver {
    pub fn new(
        spotify: Arc<dyn CatalogAdapter>,
        deezer: Arc<dyn CatalogAdapter>,
        cache: TrackCache,
    ) -> Self {
        Self {
            spotify,
            deezer,
            cache,
        }
    }

    fn adapter(&self, catalog: Catalog) -> &dyn CatalogAdapter {
        match catalog {
            Catalog::Spotify => self.spotify.as_ref(),
            Catalog::Deezer => self.deezer.as_ref(),
        }
    }

    /// Resolve a single extracted track: fetch the source side through the
    /// cache, search the sibling catalog for its equivalent.
    ///
    /// Errors only when the *source* track cannot be fetched; a sibling miss
    /// leaves that side empty.
    pub async fn resolve_track(&self, info: &ExtractedInfo) -> Result<ResolvedPair> {
        let source = self
            .cache
            .get_or_fetch(self.adapter(info.catalog), &info.id)
            .await?;

        let primary_artist = source.artists.first().cloned().unwrap_or_default();
        let matched = discard_miss(
            self.adapter(info.catalog.other())
                .search_track(&source.title, &primary_artist)
                .await,
            info.catalog.other(),
        );

        let mut pair = match info.catalog {
            Catalog::Spotify => ResolvedPair {
                spotify: vec![source],
                deezer: matched.into_iter().collect(),
            },
            Catalog::Deezer => ResolvedPair {
                spotify: matched.into_iter().collect(),
                deezer: vec![source],
            },
        };
        if let (Some(spotify), Some(deezer)) = (pair.spotify.first(), pair.deezer.first_mut()) {
            backfill_release_date(spotify, deezer);
        }
        Ok(pair)
    }

    /// Resolve every track of a playlist, in original order.
    ///
    /// Each source track is kept on its own side exactly as the playlist
    /// carries it, preserving its `(catalog, id)` identity; only the
    /// sibling catalog is searched. A track whose sibling search misses is
    /// omitted from both output arrays, keeping index i the same logical
    /// song on both sides.
    pub async fn resolve_playlist(&self, playlist: &Playlist) -> ResolvedPair {
        let mut pair = ResolvedPair::default();

        for track in &playlist.tracks {
            let primary_artist = track.artists.first().map(String::as_str).unwrap_or("");
            let sibling = track.catalog.other();
            let matched = discard_miss(
                self.adapter(sibling)
                    .search_track(&track.title, primary_artist)
                    .await,
                sibling,
            );

            let Some(matched) = matched else {
                debug!(title = %track.title, "no cross-catalog match, skipping on both sides");
                continue;
            };

            let (spotify, mut deezer) = match track.catalog {
                Catalog::Spotify => (track.clone(), matched),
                Catalog::Deezer => (matched, track.clone()),
            };
            backfill_release_date(&spotify, &mut deezer);
            pair.spotify.push(spotify);
            pair.deezer.push(deezer);
        }

        pair
    }
}

/// Degrade any search failure to an absent result. Partial pairs are a
/// normal terminal state; only the caller's source fetch is allowed to fail
/// a request.
fn discard_miss(result: Result<Track>, catalog: Catalog) -> Option<Track> {
    match result {
        Ok(track) => Some(track),
        Err(err) if err.is_not_found() => None,
        Err(err) => {
            warn!(%catalog, error = %err, "catalog search failed, degrading to no match");
            None
        }
    }
}

/// Spotify's release date is authoritative: whenever both copies of the same
/// logical song are present, the Deezer copy takes the Spotify date.
fn backfill_release_date(spotify: &Track, deezer: &mut Track) {
    if !spotify.release_date.is_empty() {
        deezer.release_date = spotify.release_date.clone();
    }
}
