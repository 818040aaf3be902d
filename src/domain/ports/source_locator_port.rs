//! Port for resolving logical asset names to files.

use std::path::PathBuf;

use async_trait::async_trait;

/// Finds the stored file behind a logical asset name.
#[async_trait]
pub trait SourceLocatorPort: Send + Sync {
    /// Returns the first matching path, or `None` when no directory holds it.
    async fn locate(&self, filename: &str) -> Option<PathBuf>;
}
