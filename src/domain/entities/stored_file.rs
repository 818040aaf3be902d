//! Files managed by the storage plumbing.

use serde::{Deserialize, Serialize};

/// Record returned after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Name on disk.
    pub filename: String,
    /// Name supplied by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Path on disk with forward slashes.
    pub path: String,
    /// RFC 3339 upload time.
    pub uploaded_at: String,
}

/// Result of relocating a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedFile {
    /// File name, unchanged by the move.
    pub filename: String,
    /// Previous path with forward slashes.
    pub from: String,
    /// New path with forward slashes.
    pub to: String,
}

/// Kind of a folder tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Directory.
    Folder,
    /// Regular file.
    File,
}

/// One node of a recursive directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Entry name.
    pub name: String,
    /// Folder or file.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Children of a folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FolderEntry>>,
}

impl FolderEntry {
    /// Creates a file node.
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            children: None,
        }
    }

    /// Creates a folder node.
    #[must_use]
    pub fn folder(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Folder,
            children: Some(children),
        }
    }
}

/// A file matched by name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// File name.
    pub name: String,
    /// Path on disk with forward slashes.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type guessed from the extension.
    pub mime_type: String,
}
