//! Image pipeline error types.

use thiserror::Error;

/// Errors produced while parsing, rendering, or serving an image variant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ImageError {
    #[error("invalid filename '{name}': {reason}")]
    InvalidFilename { name: String, reason: String },

    #[error("invalid value '{value}' for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    #[error("unsupported fit mode '{0}'")]
    UnsupportedFit(String),

    #[error("failed to read source image: {0}")]
    SourceRead(String),

    #[error("failed to decode source image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("failed to render placeholder: {0}")]
    Placeholder(String),

    #[error("image pipeline failure: {0}")]
    Internal(String),
}

impl ImageError {
    /// Creates an invalid filename error.
    #[must_use]
    pub fn invalid_filename(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilename {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(
        parameter: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns whether the request itself was malformed.
    ///
    /// Unknown format and fit tokens are transform failures, not client errors.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilename { .. } | Self::InvalidParameter { .. }
        )
    }
}
