//! WebSocket session protocol
//!
//! One logical exchange per connection, by contract: the client sends a
//! single tagged envelope, the server writes exactly one response frame
//! (or one error frame) and closes. Clients reconnect per request. A
//! malformed envelope is fatal to the session; an unrecognized action tag
//! closes without a response frame.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use tracklink_common::models::{Catalog, EntityKind};

use crate::api::search::bump_searches;
use crate::extract::extract;
use crate::users;
use crate::AppState;

/// Inbound session envelope
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(rename = "action_type")]
    pub action: String,
    #[serde(default)]
    pub url: String,
    pub payload: Option<CreatePayload>,
    pub userid: Option<String>,
}

/// Payload of a `create_playlist` request
#[derive(Debug, Deserialize)]
pub struct CreatePayload {
    pub title: String,
    #[serde(default)]
    pub tracks: Vec<String>,
    pub platform: String,
}

/// Outcome of one session exchange; every variant ends the session
pub enum SessionReply {
    /// Write this frame, then close
    Respond(Value),
    /// Write this error frame, then close
    Error(Value),
    /// Close without a response frame
    Silent,
}

/// GET /ws — upgrade into a session task
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_session(state, socket))
}

async fn handle_session(state: AppState, mut socket: WebSocket) {
    let session_id = Uuid::new_v4();
    debug!(%session_id, "session opened");

    while let Some(message) = socket.recv().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            // Pings are answered by the library; nothing else is protocol
            Ok(_) => continue,
        };

        match handle_text(&state, session_id, &text).await {
            SessionReply::Respond(value) | SessionReply::Error(value) => {
                if let Err(err) = socket.send(Message::Text(value.to_string())).await {
                    warn!(%session_id, error = %err, "failed to write session response");
                }
            }
            SessionReply::Silent => {}
        }
        break;
    }

    let _ = socket.send(Message::Close(None)).await;
    debug!(%session_id, "session closed");
}

/// Deserialize and dispatch one envelope. Split from the socket loop so the
/// whole protocol is exercisable without a live connection.
pub async fn handle_text(state: &AppState, session_id: Uuid, text: &str) -> SessionReply {
    let request: SessionRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(err) => {
            warn!(%session_id, error = %err, "malformed session envelope");
            return SessionReply::Error(error_frame("malformed request envelope"));
        }
    };

    match request.action.as_str() {
        "track" => track_action(state, &request).await,
        "playlist" => playlist_action(state, &request).await,
        "create_playlist" => create_playlist_action(state, &request).await,
        other => {
            debug!(%session_id, action = other, "unrecognized action, closing silently");
            SessionReply::Silent
        }
    }
}

fn error_frame(message: &str) -> Value {
    json!({ "desc": "error", "message": message })
}

async fn track_action(state: &AppState, request: &SessionRequest) -> SessionReply {
    let Some(info) = extract(&request.url, &state.config) else {
        return SessionReply::Error(error_frame("unsupported track link"));
    };
    if info.kind != EntityKind::Track {
        return SessionReply::Error(error_frame("link does not point at a track"));
    }

    match state.resolver().resolve_track(&info).await {
        Ok(pair) => {
            bump_searches(state).await;
            SessionReply::Respond(json!([pair.spotify, pair.deezer]))
        }
        Err(err) => {
            warn!(error = %err, "track resolution failed");
            SessionReply::Error(error_frame("error resolving track"))
        }
    }
}

async fn playlist_action(state: &AppState, request: &SessionRequest) -> SessionReply {
    let Some(info) = extract(&request.url, &state.config) else {
        return SessionReply::Error(error_frame("unsupported playlist link"));
    };
    if info.kind != EntityKind::Playlist {
        return SessionReply::Error(error_frame("link does not point at a playlist"));
    }

    let playlist = match state.adapter(info.catalog).fetch_playlist(&info.id).await {
        Ok(playlist) => playlist,
        Err(err) => {
            warn!(error = %err, "playlist fetch failed");
            return SessionReply::Error(error_frame("error fetching playlist"));
        }
    };

    let pair = state.resolver().resolve_playlist(&playlist).await;
    bump_searches(state).await;

    SessionReply::Respond(json!({
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

async fn create_playlist_action(state: &AppState, request: &SessionRequest) -> SessionReply {
    let (Some(payload), Some(userid)) = (&request.payload, &request.userid) else {
        return SessionReply::Error(error_frame("create_playlist requires payload and userid"));
    };
    let catalog: Catalog = match payload.platform.parse() {
        Ok(catalog) => catalog,
        Err(_) => return SessionReply::Error(error_frame("unknown platform")),
    };

    let user = match users::find_by_platform_id(&state.db, userid).await {
        Ok(Some(user)) => user,
        Ok(None) => return SessionReply::Error(error_frame("unknown user")),
        Err(err) => {
            warn!(error = %err, "user lookup failed");
            return SessionReply::Error(error_frame("error looking up user"));
        }
    };

    let token = match users::unseal(&user.sealed_token, &state.config.seal_key) {
        Ok(token) => token,
        Err(err) => {
            warn!(error = %err, "stored token unseal failed");
            return SessionReply::Error(error_frame("stored credential is unusable"));
        }
    };

    let result = state
        .adapter(catalog)
        .create_playlist(&user.platform_id, &token, &payload.title, &payload.tracks)
        .await;
    if let Err(err) = &result {
        warn!(%catalog, error = %err, "playlist creation failed");
    }

    SessionReply::Respond(json!({ "action": "create", "payload": result.is_ok() }))
}
