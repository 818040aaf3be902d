//! Port definition for rendered-variant caching.

use bytes::Bytes;

use crate::domain::entities::CacheKey;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// I/O error during cache operation.
    #[error("IO error: {0}")]
    IoError(String),
    /// Metadata could not be encoded or decoded.
    #[error("Metadata error: {0}")]
    MetadataError(String),
}

/// Port for storing rendered variants.
///
/// Reads never fail: every lookup problem is reported as a miss.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Returns the payload stored under `key`, or `None` on miss or expiry.
    async fn get(&self, key: &CacheKey, extension_hint: &str) -> Option<Bytes>;

    /// Stores `payload` under `key`.
    async fn put(&self, key: &CacheKey, payload: &[u8], extension: &str) -> CacheResult<()>;

    /// Removes the payload and metadata for `key`. Missing files are fine.
    async fn delete(&self, key: &CacheKey, extension: &str);
}
