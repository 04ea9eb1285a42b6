//! Resolver and cache behavior tests
//!
//! Covers:
//! - get-or-populate caching (a second lookup never re-invokes the adapter)
//! - dual-catalog equivalence resolution and its degraded partial results
//! - release-date backfill onto the Deezer copy
//! - playlist alignment (misses omitted from both sides, never null-padded)
//! - the atomic search counter

mod helpers;

use std::sync::Arc;

use helpers::{memory_pool, playlist_fixture, track_fixture, FakeCatalog};
use tracklink_common::models::{Catalog, EntityKind, ExtractedInfo};
use tracklink_common::Error;
use tracklink_server::cache::TrackCache;
use tracklink_server::resolver::Resolver;

fn extracted_track(catalog: Catalog, id: &str) -> ExtractedInfo {
    ExtractedInfo {
        catalog,
        api_url: format!("https://{catalog}.example/track/{id}"),
        id: id.to_string(),
        kind: EntityKind::Track,
    }
}

// =============================================================================
// Metadata cache
// =============================================================================

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer).with_track(track_fixture(
        Catalog::Deezer,
        "3135556",
        "Harder, Better, Faster, Stronger",
        "Daft Punk",
        "2001-03-07",
    )));
    let cache = TrackCache::new(memory_pool().await);

    let first = cache.get_or_fetch(deezer.as_ref(), "3135556").await.unwrap();
    let second = cache.get_or_fetch(deezer.as_ref(), "3135556").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(deezer.fetches(), 1, "cache hit must not re-invoke the adapter");
}

#[tokio::test]
async fn cache_miss_for_absent_track_propagates_not_found() {
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer));
    let cache = TrackCache::new(memory_pool().await);

    let result = cache.get_or_fetch(deezer.as_ref(), "nope").await;
    assert!(matches!(result, Err(Error::NotFound)));
}

// =============================================================================
// Single-track equivalence resolution
// =============================================================================

#[tokio::test]
async fn resolve_track_pairs_both_catalogs_and_backfills_release_date() {
    // Deezer search results carry no release date; the Spotify copy's date
    // is authoritative and flows onto the Deezer side.
    let spotify = Arc::new(FakeCatalog::new(Catalog::Spotify).with_search_hit(track_fixture(
        Catalog::Spotify,
        "0DiWol3AO6WpXZgp0goxAV",
        "One More Time",
        "Daft Punk",
        "2001-03-07",
    )));
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer).with_track(track_fixture(
        Catalog::Deezer,
        "916424",
        "One More Time",
        "Daft Punk",
        "",
    )));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );

    let pair = resolver
        .resolve_track(&extracted_track(Catalog::Deezer, "916424"))
        .await
        .unwrap();

    assert_eq!(pair.spotify.len(), 1);
    assert_eq!(pair.deezer.len(), 1);
    assert_eq!(pair.spotify[0].id, "0DiWol3AO6WpXZgp0goxAV");
    assert_eq!(pair.deezer[0].id, "916424");
    assert_eq!(pair.deezer[0].release_date, "2001-03-07");
}

#[tokio::test]
async fn sibling_miss_degrades_to_partial_pair() {
    let spotify = Arc::new(FakeCatalog::new(Catalog::Spotify));
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer).with_track(track_fixture(
        Catalog::Deezer,
        "916424",
        "Obscure B-Side",
        "Nobody",
        "2010-01-01",
    )));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );

    let pair = resolver
        .resolve_track(&extracted_track(Catalog::Deezer, "916424"))
        .await
        .unwrap();

    assert!(pair.spotify.is_empty(), "a sibling miss is not an error");
    assert_eq!(pair.deezer.len(), 1);
}

#[tokio::test]
async fn source_miss_is_an_error() {
    let spotify = Arc::new(FakeCatalog::new(Catalog::Spotify));
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );

    let result = resolver
        .resolve_track(&extracted_track(Catalog::Deezer, "missing"))
        .await;
    assert!(matches!(result, Err(Error::NotFound)));
}

#[tokio::test]
async fn resolution_is_idempotent() {
    let spotify = Arc::new(FakeCatalog::new(Catalog::Spotify).with_search_hit(track_fixture(
        Catalog::Spotify,
        "sp1",
        "Around the World",
        "Daft Punk",
        "1997-01-17",
    )));
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer).with_track(track_fixture(
        Catalog::Deezer,
        "dz1",
        "Around the World",
        "Daft Punk",
        "1997-01-17",
    )));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );
    let info = extracted_track(Catalog::Deezer, "dz1");

    let first = resolver.resolve_track(&info).await.unwrap();
    let second = resolver.resolve_track(&info).await.unwrap();

    assert_eq!(first.spotify, second.spotify);
    assert_eq!(first.deezer, second.deezer);
    // the source side is cached after the first resolution
    assert_eq!(deezer.fetches(), 1);
}

// =============================================================================
// Playlist resolution
// =============================================================================

#[tokio::test]
async fn playlist_misses_are_skipped_on_both_sides() {
    let source_tracks = vec![
        track_fixture(Catalog::Deezer, "d1", "Alpha", "X", ""),
        track_fixture(Catalog::Deezer, "d2", "Beta", "Y", ""),
        track_fixture(Catalog::Deezer, "d3", "Gamma", "Z", ""),
    ];
    let playlist = playlist_fixture(Catalog::Deezer, "pl1", "Mix", source_tracks);

    // "Beta" has no Spotify match, so it must vanish from both output
    // arrays rather than leave a hole on one side.
    let spotify = Arc::new(
        FakeCatalog::new(Catalog::Spotify)
            .with_search_hit(track_fixture(Catalog::Spotify, "s1", "Alpha", "X", "2001-01-01"))
            .with_search_hit(track_fixture(Catalog::Spotify, "s3", "Gamma", "Z", "2003-03-03")),
    );
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );

    let pair = resolver.resolve_playlist(&playlist).await;

    assert_eq!(pair.spotify.len(), pair.deezer.len());
    assert_eq!(pair.spotify.len(), 2);
    // positional alignment: index i is the same logical song on both
    // sides, and the source side is the playlist's own tracks
    assert_eq!(pair.spotify[0].id, "s1");
    assert_eq!(pair.deezer[0].id, "d1");
    assert_eq!(pair.spotify[1].id, "s3");
    assert_eq!(pair.deezer[1].id, "d3");
    // release dates flow from the Spotify copies
    assert_eq!(pair.deezer[0].release_date, "2001-01-01");
    assert_eq!(pair.deezer[1].release_date, "2003-03-03");
    // only the sibling catalog is ever searched
    assert_eq!(spotify.searches(), 3);
    assert_eq!(deezer.searches(), 0);
}

#[tokio::test]
async fn playlist_source_tracks_keep_their_identity() {
    // A same-catalog re-search could return a different pressing of the
    // song; the source side must stay the playlist's own track.
    let source_tracks = vec![track_fixture(Catalog::Deezer, "d1", "Alpha", "X", "")];
    let playlist = playlist_fixture(Catalog::Deezer, "pl1", "Mix", source_tracks);

    let spotify = Arc::new(FakeCatalog::new(Catalog::Spotify).with_search_hit(track_fixture(
        Catalog::Spotify,
        "s1",
        "Alpha",
        "X",
        "2001-01-01",
    )));
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer).with_search_hit(track_fixture(
        Catalog::Deezer,
        "d1-remaster",
        "Alpha",
        "X",
        "",
    )));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );

    let pair = resolver.resolve_playlist(&playlist).await;

    assert_eq!(pair.deezer[0].id, "d1");
    assert_eq!(deezer.searches(), 0);
}

#[tokio::test]
async fn empty_playlist_resolves_to_empty_pair() {
    let spotify = Arc::new(FakeCatalog::new(Catalog::Spotify));
    let deezer = Arc::new(FakeCatalog::new(Catalog::Deezer));
    let resolver = Resolver::new(
        spotify.clone(),
        deezer.clone(),
        TrackCache::new(memory_pool().await),
    );
    let playlist = playlist_fixture(Catalog::Spotify, "pl", "Empty", Vec::new());

    let pair = resolver.resolve_playlist(&playlist).await;
    assert!(pair.spotify.is_empty());
    assert!(pair.deezer.is_empty());
}

// =============================================================================
// Search counter
// =============================================================================

#[tokio::test]
async fn counter_starts_absent_and_counts_each_increment() {
    let cache = TrackCache::new(memory_pool().await);

    assert_eq!(cache.searches().await.unwrap(), 0);
    assert_eq!(cache.increment_searches().await.unwrap(), 1);
    assert_eq!(cache.increment_searches().await.unwrap(), 2);
    assert_eq!(cache.increment_searches().await.unwrap(), 3);
    assert_eq!(cache.searches().await.unwrap(), 3);
}
