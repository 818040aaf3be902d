//! JSON envelope shared by the non-image endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// `{status, message, result}` body.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Human readable summary.
    pub message: String,
    /// Payload, `null` on errors.
    pub result: Option<T>,
}

/// Builds a 200 envelope around `result`.
pub fn success<T: Serialize>(message: impl Into<String>, result: T) -> Response {
    let body = Envelope {
        status: StatusCode::OK.as_u16(),
        message: message.into(),
        result: Some(result),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Builds an envelope with no result.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body: Envelope<()> = Envelope {
        status: status.as_u16(),
        message: message.into(),
        result: None,
    };
    (status, Json(body)).into_response()
}
