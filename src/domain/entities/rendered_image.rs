//! Output of the image serving pipeline.

use bytes::Bytes;

/// Where a rendered variant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOrigin {
    /// Read back from the disk cache.
    Cache,
    /// Rendered from the stored source asset.
    Source,
    /// Rendered from the synthetic placeholder.
    Placeholder,
}

impl std::fmt::Display for RenderOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Source => write!(f, "source"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Encoded bytes plus their content type, as produced by the transform engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: &'static str,
    /// Encoded payload.
    pub bytes: Vec<u8>,
}

/// A variant ready to be written to the client.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// MIME type, e.g. `image/jpeg`.
    pub content_type: &'static str,
    /// Encoded payload.
    pub bytes: Bytes,
    /// How the payload was obtained.
    pub origin: RenderOrigin,
}

impl RenderedImage {
    /// Creates a rendered image.
    #[must_use]
    pub const fn new(content_type: &'static str, bytes: Bytes, origin: RenderOrigin) -> Self {
        Self {
            content_type,
            bytes,
            origin,
        }
    }

    /// Strong entity tag derived from the payload.
    #[must_use]
    pub fn etag(&self) -> String {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(&self.bytes);
        format!("\"{}\"", hex::encode(&digest[..16]))
    }
}
