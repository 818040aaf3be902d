//! Plain file storage on the local filesystem.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use super::DirectoryLocator;
use crate::domain::entities::{
    FolderEntry, MovedFile, SearchHit, StoredFile, validate_asset_name,
};
use crate::domain::errors::StorageError;
use crate::domain::media_types::{MediaCategory, mime_from_filename};
use crate::domain::ports::{FileStoragePort, NewFile, SourceLocatorPort};

/// Upload, search and listing over the configured storage directories.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    locator: DirectoryLocator,
    upload_dir: PathBuf,
}

impl LocalFileStore {
    /// Creates a store that searches `directories` and writes to `upload_dir`.
    #[must_use]
    pub const fn new(directories: Vec<PathBuf>, upload_dir: PathBuf) -> Self {
        Self {
            locator: DirectoryLocator::new(directories),
            upload_dir,
        }
    }

    /// Directory uploads land in.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    fn primary_dir(&self) -> Result<&Path, StorageError> {
        self.locator
            .directories()
            .first()
            .map(PathBuf::as_path)
            .ok_or_else(|| StorageError::NotFound("no storage directory configured".to_string()))
    }

    /// Resolves a file directly inside one of the storage directories.
    async fn existing(&self, filename: &str) -> Result<PathBuf, StorageError> {
        validate_asset_name(filename)
            .map_err(|_| StorageError::InvalidPath(filename.to_string()))?;
        self.locator
            .locate(filename)
            .await
            .ok_or_else(|| StorageError::NotFound(FILE_NOT_FOUND.to_string()))
    }
}

const FILE_NOT_FOUND: &str = "File not found.";

fn missing_as_not_found(error: std::io::Error) -> StorageError {
    if error.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(FILE_NOT_FOUND.to_string())
    } else {
        StorageError::Io(error)
    }
}

/// Turns a client supplied relative path into a safe one.
///
/// Empty segments and `.` are dropped; `..`, roots and prefixes are rejected.
///
/// # Errors
/// Returns `StorageError::InvalidPath` for anything escaping the base.
pub fn sanitize_relative(raw: &str) -> Result<PathBuf, StorageError> {
    if raw.contains('\0') {
        return Err(StorageError::InvalidPath(raw.to_string()));
    }

    let normalized = raw.replace('\\', "/");
    let mut out = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath(raw.to_string()));
            }
        }
    }
    Ok(out)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn collect_matches(
    dir: &Path,
    needle: &str,
    category: Option<MediaCategory>,
    hits: &mut Vec<SearchHit>,
) -> std::io::Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            collect_matches(&path, needle, category, hits)?;
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().contains(needle) {
            continue;
        }
        let mime_type = mime_from_filename(&name);
        if category.is_some_and(|c| !c.contains(mime_type)) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or_default();
        hits.push(SearchHit {
            name,
            path: display_path(&path),
            size,
            mime_type: mime_type.to_string(),
        });
    }
    Ok(())
}

fn build_tree(dir: &Path) -> std::io::Result<Vec<FolderEntry>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            nodes.push(FolderEntry::folder(name, build_tree(&entry.path())?));
        } else {
            nodes.push(FolderEntry::file(name));
        }
    }
    Ok(nodes)
}

#[async_trait]
impl FileStoragePort for LocalFileStore {
    async fn write(&self, file: NewFile) -> Result<StoredFile, StorageError> {
        let sub_dir = sanitize_relative(&file.sub_dir)?;
        validate_asset_name(&file.stored_name)
            .map_err(|_| StorageError::InvalidPath(file.stored_name.clone()))?;

        let target_dir = self.upload_dir.join(sub_dir);
        fs::create_dir_all(&target_dir).await?;

        let path = target_dir.join(&file.stored_name);
        fs::write(&path, &file.bytes).await?;

        info!(
            path = %path.display(),
            size = file.bytes.len(),
            mime_type = %file.mime_type,
            "Stored uploaded file"
        );

        Ok(StoredFile {
            filename: file.stored_name,
            original_name: file.original_name,
            mime_type: file.mime_type,
            size: file.bytes.len() as u64,
            path: display_path(&path),
            uploaded_at: Utc::now().to_rfc3339(),
        })
    }

    async fn search(
        &self,
        query: &str,
        category: Option<MediaCategory>,
    ) -> Result<Vec<SearchHit>, StorageError> {
        let needle = query.trim().to_lowercase();
        let directories = self.locator.directories().to_vec();

        let hits = tokio::task::spawn_blocking(move || {
            let mut hits = Vec::new();
            for dir in directories.iter().filter(|d| d.is_dir()) {
                collect_matches(dir, &needle, category, &mut hits)?;
            }
            Ok::<_, std::io::Error>(hits)
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        debug!(query, matches = hits.len(), "Searched storage");
        Ok(hits)
    }

    async fn folder_tree(&self, relative: &str) -> Result<Vec<FolderEntry>, StorageError> {
        let relative = sanitize_relative(relative)?;
        let dir = self.primary_dir()?.join(relative);
        if !fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(StorageError::NotFound(format!(
                "Directory '{}' does not exist.",
                display_path(&dir)
            )));
        }

        tokio::task::spawn_blocking(move || build_tree(&dir))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
            .map_err(StorageError::from)
    }

    async fn find(&self, filename: &str) -> Option<PathBuf> {
        self.locator.locate(filename).await
    }

    async fn move_file(
        &self,
        filename: &str,
        destination: &str,
    ) -> Result<MovedFile, StorageError> {
        let source = self.existing(filename).await?;
        let target_dir = self.primary_dir()?.join(sanitize_relative(destination)?);
        let target = target_dir.join(filename);

        if fs::try_exists(&target).await? {
            return Err(StorageError::Rejected(format!(
                "File '{filename}' already exists in '{}'.",
                display_path(&target_dir)
            )));
        }

        fs::create_dir_all(&target_dir).await?;
        fs::rename(&source, &target)
            .await
            .map_err(missing_as_not_found)?;

        info!(
            from = %source.display(),
            to = %target.display(),
            "Moved stored file"
        );

        Ok(MovedFile {
            filename: filename.to_string(),
            from: display_path(&source),
            to: display_path(&target),
        })
    }

    async fn delete_file(&self, filename: &str) -> Result<String, StorageError> {
        let path = self.existing(filename).await?;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to delete stored file");
            }
            missing_as_not_found(e)
        })?;

        info!(path = %path.display(), "Deleted stored file");
        Ok(display_path(&path))
    }
}
