//! Shared-link parsing into canonical catalog descriptors
//!
//! A shared link like `https://www.deezer.com/en/track/3135556?utm=...`
//! becomes `(deezer, "3135556", track)` plus the API url for the entity.
//! Path segments are matched structurally (locale prefixes and share junk
//! tolerated) rather than sliced at fixed offsets, so a catalog reshuffling
//! its link scheme fails loudly as `None` instead of yielding garbage ids.

use url::Url;

use tracklink_common::config::Config;
use tracklink_common::models::{Catalog, EntityKind, ExtractedInfo};

/// Parse a raw (possibly percent-encoded) shared link.
///
/// Returns `None` for unknown hosts or paths without a recognizable entity;
/// callers treat that as unsupported input, not as a failure.
pub fn extract(raw: &str, config: &Config) -> Option<ExtractedInfo> {
    let decoded = urlencoding::decode(raw).ok()?;
    let parsed = Url::parse(decoded.trim()).ok()?;

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

    match parsed.host_str()? {
        "www.deezer.com" | "deezer.com" => {
            let (kind, id) = entity_segments(&segments)?;
            let api_url = match kind {
                EntityKind::Track => format!("{}/track/{}", config.deezer.api_base, id),
                EntityKind::Playlist => format!("{}/playlist/{}", config.deezer.api_base, id),
            };
            Some(ExtractedInfo {
                catalog: Catalog::Deezer,
                api_url,
                id,
                kind,
            })
        }
        "open.spotify.com" => {
            let (kind, id) = entity_segments(&segments)?;
            let api_url = match kind {
                EntityKind::Track => format!("{}/v1/tracks/{}", config.spotify.api_base, id),
                EntityKind::Playlist => format!("{}/v1/playlists/{}", config.spotify.api_base, id),
            };
            Some(ExtractedInfo {
                catalog: Catalog::Spotify,
                api_url,
                id,
                kind,
            })
        }
        _ => None,
    }
}

/// Find the `track`/`playlist` segment and take the id that follows it
fn entity_segments(segments: &[&str]) -> Option<(EntityKind, String)> {
    let mut iter = segments.iter();
    while let Some(segment) = iter.next() {
        let kind = match *segment {
            "track" => EntityKind::Track,
            "playlist" => EntityKind::Playlist,
            _ => continue,
        };
        let id = iter.next().filter(|id| !id.is_empty())?;
        return Some((kind, id.to_string()));
    }
    None
}
