//! File storage error types.

use thiserror::Error;

/// Errors raised by the upload, search, preview and folder plumbing.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid path '{0}'")]
    InvalidPath(String),

    #[error("{0}")]
    Rejected(String),

    #[error("file '{name}' exceeds the {limit} byte limit")]
    TooLarge { name: String, limit: u64 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Returns whether the caller sent something unacceptable.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath(_) | Self::Rejected(_) | Self::TooLarge { .. }
        )
    }
}
