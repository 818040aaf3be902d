//! Ordered directory search for asset sources.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::trace;

use crate::domain::entities::validate_asset_name;
use crate::domain::ports::SourceLocatorPort;

/// Resolves asset names against an ordered list of directories.
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    directories: Vec<PathBuf>,
}

impl DirectoryLocator {
    /// Creates a locator; earlier directories take precedence.
    #[must_use]
    pub const fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    /// Configured directories in lookup order.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

#[async_trait]
impl SourceLocatorPort for DirectoryLocator {
    async fn locate(&self, filename: &str) -> Option<PathBuf> {
        if validate_asset_name(filename).is_err() {
            return None;
        }

        for dir in &self.directories {
            let candidate = dir.join(filename);
            if let Ok(meta) = fs::metadata(&candidate).await
                && meta.is_file()
            {
                trace!(filename, path = %candidate.display(), "Located source");
                return Some(candidate);
            }
        }

        trace!(filename, "Source not found in any directory");
        None
    }
}
