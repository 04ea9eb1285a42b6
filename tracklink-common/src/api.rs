//! Standard response envelope for the HTTP endpoints
//!
//! Every non-session response carries `{data, message, error, status}` with
//! `status` mirroring the HTTP status code. Session frames do not use this
//! envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Error;

/// Wire shape of every non-session HTTP response
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub data: Value,
    pub message: String,
    pub error: Option<String>,
    pub status: u16,
}

fn envelope(status: StatusCode, data: Value, message: &str, error: Option<String>) -> Response {
    let body = Envelope {
        data,
        message: message.to_string(),
        error,
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

/// 200 with a data payload
pub fn ok(data: impl Serialize) -> Response {
    let data = serde_json::to_value(data).unwrap_or(Value::Null);
    envelope(StatusCode::OK, data, "Resource found", None)
}

/// 201 with the created resource
pub fn created(data: impl Serialize) -> Response {
    let data = serde_json::to_value(data).unwrap_or(Value::Null);
    envelope(StatusCode::CREATED, data, "The resource has been created", None)
}

/// 400 with an error string
pub fn bad_request(error: &str) -> Response {
    envelope(
        StatusCode::BAD_REQUEST,
        Value::Null,
        "The request is bad",
        Some(error.to_string()),
    )
}

/// 401 with an error string
pub fn unauthorized(error: &str) -> Response {
    envelope(
        StatusCode::UNAUTHORIZED,
        Value::Null,
        "The request is unauthorized",
        Some(error.to_string()),
    )
}

/// 404, no error payload
pub fn not_found() -> Response {
    envelope(
        StatusCode::NOT_FOUND,
        Value::Null,
        "The resource does not exist",
        None,
    )
}

/// 500 with an error string
pub fn internal_error(error: &str) -> Response {
    envelope(
        StatusCode::INTERNAL_SERVER_ERROR,
        Value::Null,
        "Internal Server Error",
        Some(error.to_string()),
    )
}

/// 501 for unsupported operations
pub fn not_implemented() -> Response {
    envelope(
        StatusCode::NOT_IMPLEMENTED,
        Value::Null,
        "Not yet implemented",
        None,
    )
}

/// Map an [`Error`] onto the envelope it should answer with
pub fn from_error(err: &Error) -> Response {
    match err {
        Error::NotFound => not_found(),
        Error::Unauthorized(msg) => unauthorized(msg),
        Error::InvalidInput(msg) => bad_request(msg),
        other => internal_error(&other.to_string()),
    }
}

/// Convenience for ad hoc JSON payloads in handlers
pub fn ok_json(data: Value) -> Response {
    envelope(StatusCode::OK, data, "Resource found", None)
}

/// Health payload shared shape (no envelope, by convention)
pub fn health(module: &str, version: &str) -> Response {
    Json(json!({
        "status": "ok",
        "module": module,
        "version": version,
    }))
    .into_response()
}
