//! Upload DTOs.

use serde::Deserialize;

/// One base64 encoded file.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFile {
    /// File contents, optionally as a `data:` URL.
    pub base64: String,
    /// Client side file name.
    pub filename: String,
    /// Declared MIME type.
    pub mimetype: String,
    /// Sub-directory below the upload root.
    #[serde(default)]
    pub dir: Option<String>,
}

/// Body of `POST /file/upload`: a single file or a batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UploadRequest {
    /// `{ "files": [...], "dir": "..." }`
    Batch {
        /// Files to store.
        files: Vec<UploadFile>,
        /// Default sub-directory for files that name none.
        #[serde(default)]
        dir: Option<String>,
    },
    /// A bare file object.
    Single(UploadFile),
}

impl UploadRequest {
    /// Flattens the request, applying the batch directory as a default.
    #[must_use]
    pub fn into_files(self) -> Vec<UploadFile> {
        match self {
            Self::Single(file) => vec![file],
            Self::Batch { files, dir } => files
                .into_iter()
                .map(|mut file| {
                    if file.dir.is_none() {
                        file.dir.clone_from(&dir);
                    }
                    file
                })
                .collect(),
        }
    }
}
