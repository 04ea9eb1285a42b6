//! Playlist conversion endpoint

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use tracklink_common::api;
use tracklink_common::models::EntityKind;

use crate::extract::extract;
use crate::AppState;

use super::search::bump_searches;

/// Query parameters for playlist conversion
#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    /// Shared link to a playlist on either catalog
    pub track: String,
}

/// GET /zoovify/playlist?track=<shared-url>
///
/// Fetches the source playlist and resolves every track across both
/// catalogs. Tracks unmatched on either side are omitted from both arrays,
/// preserving positional alignment.
pub async fn convert_playlist(
    State(state): State<AppState>,
    Query(query): Query<PlaylistQuery>,
) -> Response {
    let Some(info) = extract(&query.track, &state.config) else {
        return api::bad_request("unrecognized playlist link");
    };
    if info.kind != EntityKind::Playlist {
        return api::bad_request("link does not point at a playlist");
    }

    let playlist = match state.adapter(info.catalog).fetch_playlist(&info.id).await {
        Ok(playlist) => playlist,
        Err(err) => {
            warn!(error = %err, "playlist fetch failed");
            return api::from_error(&err);
        }
    };

    let pair = state.resolver().resolve_playlist(&playlist).await;
    bump_searches(&state).await;

    api::ok_json(json!({
        "playlist_title": playlist.title,
        "payload": [&pair.spotify, &pair.deezer],
        "owner": &playlist.owner,
        "playlist_meta": &playlist,
        "platforms": {
            "spotify": &pair.spotify,
            "deezer": &pair.deezer,
        },
    }))
}
