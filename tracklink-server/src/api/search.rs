//! Single-track search endpoint

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use tracklink_common::api;
use tracklink_common::models::EntityKind;

use crate::extract::extract;
use crate::AppState;

/// Query parameters for track search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Shared link to a track on either catalog
    pub track: String,
}

/// GET /search?track=<shared-url>
///
/// Resolves the linked track across both catalogs and answers the standard
/// envelope with `[[spotify...],[deezer...]]` as data. A miss on the sibling
/// catalog leaves that side empty; a miss on the source catalog is a 404.
pub async fn search_track(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let Some(info) = extract(&query.track, &state.config) else {
        return api::bad_request("unrecognized track link");
    };
    if info.kind != EntityKind::Track {
        return api::bad_request("link does not point at a track");
    }

    match state.resolver().resolve_track(&info).await {
        Ok(pair) => {
            bump_searches(&state).await;
            api::ok_json(json!([pair.spotify, pair.deezer]))
        }
        Err(err) => {
            warn!(error = %err, "track resolution failed");
            api::from_error(&err)
        }
    }
}

/// Bump the operational search counter; failures are logged, never surfaced
pub(crate) async fn bump_searches(state: &AppState) {
    match state.cache().increment_searches().await {
        Ok(count) => info!(searches = count, "search counter incremented"),
        Err(err) => warn!(error = %err, "failed to increment search counter"),
    }
}
