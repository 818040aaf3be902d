//! Disk-based cache of rendered image variants.

use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::{CacheKey, CacheMetadata};
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort};

/// Suffix of the sidecar metadata file.
pub const META_SUFFIX: &str = ".meta.json";

/// Disk cache storing one payload file and one metadata sidecar per key.
///
/// The directory is created on first write, so constructing a cache never
/// touches the filesystem.
#[derive(Debug, Clone)]
pub struct DiskImageCache {
    cache_dir: PathBuf,
    ttl_secs: u64,
}

impl DiskImageCache {
    /// Creates a cache rooted at `cache_dir` whose entries live `ttl_secs`.
    #[must_use]
    pub const fn new(cache_dir: PathBuf, ttl_secs: u64) -> Self {
        Self {
            cache_dir,
            ttl_secs,
        }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the configured ttl in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn payload_path(&self, key: &CacheKey, extension: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}{extension}"))
    }

    fn meta_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{key}{META_SUFFIX}"))
    }

    async fn read_metadata(&self, key: &CacheKey) -> CacheResult<Option<CacheMetadata>> {
        let path = self.meta_path(key);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::IoError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| CacheError::MetadataError(format!("{}: {e}", path.display())))
    }

    async fn lookup(&self, key: &CacheKey, extension_hint: &str) -> CacheResult<Option<Bytes>> {
        let Some(meta) = self.read_metadata(key).await? else {
            trace!(key = %key, "Disk cache miss");
            return Ok(None);
        };

        if meta.is_expired(Utc::now()) {
            debug!(key = %key, ttl = meta.ttl, "Disk cache entry expired");
            self.delete(key, &meta.extension).await;
            return Ok(None);
        }

        let extension = if extension_hint.is_empty() {
            meta.extension.as_str()
        } else {
            extension_hint
        };
        let path = self.payload_path(key, extension);

        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(key = %key, path = %path.display(), "Disk cache hit");
                Ok(Some(Bytes::from(bytes)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(key = %key, "Metadata without payload, treating as miss");
                Ok(None)
            }
            Err(e) => Err(CacheError::IoError(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Writes an entry stamped with `created_at`.
    ///
    /// # Errors
    /// Returns error if the directory or either file cannot be written.
    pub(crate) async fn write_entry(
        &self,
        key: &CacheKey,
        payload: &[u8],
        extension: &str,
        created_at: DateTime<Utc>,
    ) -> CacheResult<()> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| CacheError::IoError(format!("Failed to create cache dir: {e}")))?;

        let path = self.payload_path(key, extension);
        self.write_atomic(&path, payload.to_vec()).await?;

        let meta = CacheMetadata::new(created_at, self.ttl_secs, extension);
        let json =
            serde_json::to_vec(&meta).map_err(|e| CacheError::MetadataError(e.to_string()))?;
        self.write_atomic(&self.meta_path(key), json).await?;

        debug!(key = %key, path = %path.display(), size = payload.len(), "Stored variant in disk cache");
        Ok(())
    }

    /// Writes through a temporary file in the cache directory and renames it
    /// into place, so readers never observe a partially written file.
    async fn write_atomic(&self, path: &Path, bytes: Vec<u8>) -> CacheResult<()> {
        let dir = self.cache_dir.clone();
        let target = path.to_path_buf();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp_file = tempfile::NamedTempFile::new_in(&dir)?;
            temp_file.write_all(&bytes)?;
            temp_file.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::IoError(format!("Cache write task failed: {e}")))?
        .map_err(|e| CacheError::IoError(format!("Failed to write {}: {e}", path.display())))
    }

    /// Deletes every entry whose metadata is expired or unreadable.
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return 0;
        };

        let now = Utc::now();
        let mut removed = 0usize;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let file_name = entry.file_name();
            let Some(key) = file_name.to_str().and_then(|n| n.strip_suffix(META_SUFFIX)) else {
                continue;
            };
            let key = CacheKey::new(key);

            let meta = fs::read(entry.path())
                .await
                .ok()
                .and_then(|raw| serde_json::from_slice::<CacheMetadata>(&raw).ok());

            let extension = match meta {
                Some(meta) if meta.is_expired(now) => meta.extension,
                Some(_) => continue,
                None => String::new(),
            };

            self.delete(&key, &extension).await;
            removed += 1;
        }

        if removed > 0 {
            debug!(removed, "Purged expired disk cache entries");
        }
        removed
    }

    /// Checks if live metadata exists for `key`.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        matches!(self.read_metadata(key).await, Ok(Some(meta)) if !meta.is_expired(Utc::now()))
    }
}

#[async_trait::async_trait]
impl ImageCachePort for DiskImageCache {
    async fn get(&self, key: &CacheKey, extension_hint: &str) -> Option<Bytes> {
        match self.lookup(key, extension_hint).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Disk cache read failed, treating as miss");
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, payload: &[u8], extension: &str) -> CacheResult<()> {
        self.write_entry(key, payload, extension, Utc::now()).await
    }

    async fn delete(&self, key: &CacheKey, extension: &str) {
        for path in [self.payload_path(key, extension), self.meta_path(key)] {
            if let Err(e) = fs::remove_file(&path).await
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!(key = %key, path = %path.display(), error = %e, "Failed to evict from disk cache");
            }
        }
        debug!(key = %key, "Evicted from disk cache");
    }
}
