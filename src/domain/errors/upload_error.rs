//! Upload validation error types.

use thiserror::Error;

use super::StorageError;

/// Errors raised while accepting uploaded files.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no files provided")]
    Empty,

    #[error("file '{filename}' is not valid base64: {reason}")]
    InvalidBase64 { filename: String, reason: String },

    #[error("file type '{mime_type}' is not allowed")]
    UnsupportedType { mime_type: String },

    #[error("invalid filename '{0}'")]
    InvalidFilename(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Returns whether the caller sent something unacceptable.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_client_error(),
            _ => true,
        }
    }
}
