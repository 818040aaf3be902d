//! Maps domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use super::response::failure;
use crate::domain::errors::{ImageError, StorageError, UploadError};

/// Image pipeline failure, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ImageFailure(pub ImageError);

impl From<ImageError> for ImageFailure {
    fn from(error: ImageError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ImageFailure {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            debug!(error = %self.0, "Rejected image request");
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self.0, "Image request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Error for the enveloped endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed.
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        failure(status, self.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(message) => Self::NotFound(message),
            e if e.is_client_error() => Self::BadRequest(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(error: UploadError) -> Self {
        match error {
            UploadError::Storage(e) => e.into(),
            e => Self::BadRequest(e.to_string()),
        }
    }
}
