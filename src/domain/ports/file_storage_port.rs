//! Port for the plain file storage tree.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::entities::{FolderEntry, MovedFile, SearchHit, StoredFile};
use crate::domain::errors::StorageError;
use crate::domain::media_types::MediaCategory;

/// Bytes accepted for storage, already validated by the caller.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Sub-directory below the upload root, may be empty.
    pub sub_dir: String,
    /// Name to write on disk.
    pub stored_name: String,
    /// Name supplied by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Access to the storage directories.
#[async_trait]
pub trait FileStoragePort: Send + Sync {
    /// Writes a new file below the upload root.
    async fn write(&self, file: NewFile) -> Result<StoredFile, StorageError>;

    /// Case-insensitive substring search over every storage directory.
    async fn search(
        &self,
        query: &str,
        category: Option<MediaCategory>,
    ) -> Result<Vec<SearchHit>, StorageError>;

    /// Recursive listing below the primary storage directory.
    async fn folder_tree(&self, relative: &str) -> Result<Vec<FolderEntry>, StorageError>;

    /// Path of the first stored file with this name.
    async fn find(&self, filename: &str) -> Option<PathBuf>;

    /// Moves the first stored file with this name into `destination`,
    /// relative to the primary storage directory.
    async fn move_file(&self, filename: &str, destination: &str)
    -> Result<MovedFile, StorageError>;

    /// Deletes the first stored file with this name, returning its path.
    async fn delete_file(&self, filename: &str) -> Result<String, StorageError>;
}
