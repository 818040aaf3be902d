//! Cache key derivation for rendered variants.

use std::fmt;

use super::transform::TransformRequest;

/// Deterministic identifier of one rendered variant of one asset.
///
/// Every parameter occupies its own delimited slot, so two requests share a
/// key exactly when their effective parameters match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a transform request.
    #[must_use]
    pub fn derive(request: &TransformRequest) -> Self {
        let width = request.width().map(|w| w.to_string()).unwrap_or_default();
        let height = request.height().map(|h| h.to_string()).unwrap_or_default();
        let format = request.format().map(|f| f.token()).unwrap_or_default();
        let quality = request.quality().map(|q| q.to_string()).unwrap_or_default();
        let fit = request.fit().map(|f| f.token()).unwrap_or_default();

        Self(format!(
            "{}-w{width}-h{height}-fm{format}-q{quality}-fit{fit}",
            request.source_filename()
        ))
    }

    /// Wraps an existing key without derivation.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
