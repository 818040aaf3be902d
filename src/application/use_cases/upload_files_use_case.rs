//! Upload use case: decode, validate, name and store base64 files.

use std::sync::{Arc, LazyLock};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::dto::{UploadFile, UploadRequest};
use crate::domain::entities::{StoredFile, validate_asset_name};
use crate::domain::errors::{StorageError, UploadError};
use crate::domain::media_types::{extension_for_mime, is_upload_allowed};
use crate::domain::ports::{FileStoragePort, NewFile, NotificationPort};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// How uploaded files are checked and named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Largest accepted decoded size in bytes.
    pub max_bytes: u64,
    /// Keep the client's name behind a millisecond timestamp instead of a UUID.
    pub keep_original_name: bool,
}

/// Handles the upload workflow.
#[derive(Clone)]
pub struct UploadFilesUseCase {
    storage: Arc<dyn FileStoragePort>,
    notifier: Option<Arc<dyn NotificationPort>>,
    policy: UploadPolicy,
}

impl UploadFilesUseCase {
    /// Creates new upload use case.
    #[must_use]
    pub const fn new(storage: Arc<dyn FileStoragePort>, policy: UploadPolicy) -> Self {
        Self {
            storage,
            notifier: None,
            policy,
        }
    }

    /// Fires `notifier` once per batch that wrote at least one file.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Validates every file, then stores them in order.
    ///
    /// Nothing is written if any file fails validation.
    ///
    /// # Errors
    /// Returns error if a file is rejected or cannot be written.
    pub async fn execute(&self, request: UploadRequest) -> Result<Vec<StoredFile>, UploadError> {
        let files = request.into_files();
        if files.is_empty() {
            return Err(UploadError::Empty);
        }

        let prepared = files
            .into_iter()
            .map(|file| self.prepare(file))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = prepared.len(), "Upload batch validated");

        let mut stored = Vec::with_capacity(prepared.len());
        for file in prepared {
            match self.storage.write(file).await {
                Ok(record) => stored.push(record),
                Err(e) => {
                    warn!(error = %e, written = stored.len(), "Upload batch aborted");
                    self.notify(&stored);
                    return Err(e.into());
                }
            }
        }

        info!(count = stored.len(), "Upload batch stored");
        self.notify(&stored);
        Ok(stored)
    }

    fn notify(&self, stored: &[StoredFile]) {
        if stored.is_empty() {
            return;
        }
        if let Some(notifier) = &self.notifier {
            let names: Vec<&str> = stored.iter().map(|f| f.filename.as_str()).collect();
            notifier.notify(&names.join(", "));
        }
    }

    fn prepare(&self, file: UploadFile) -> Result<NewFile, UploadError> {
        let mime_type = file.mimetype.trim().to_ascii_lowercase();
        if !is_upload_allowed(&mime_type) {
            return Err(UploadError::UnsupportedType {
                mime_type: file.mimetype,
            });
        }

        let original_name = base_name(&file.filename).to_string();
        if original_name.is_empty() {
            return Err(UploadError::InvalidFilename(file.filename));
        }

        let bytes = decode_payload(&file.base64).map_err(|reason| UploadError::InvalidBase64 {
            filename: original_name.clone(),
            reason,
        })?;

        if bytes.len() as u64 > self.policy.max_bytes {
            return Err(StorageError::TooLarge {
                name: original_name,
                limit: self.policy.max_bytes,
            }
            .into());
        }

        let stored_name = if self.policy.keep_original_name {
            timestamped_name(&original_name, Utc::now().timestamp_millis())
        } else {
            unique_name(&original_name, &mime_type)
        };
        validate_asset_name(&stored_name)
            .map_err(|_| UploadError::InvalidFilename(original_name.clone()))?;

        Ok(NewFile {
            sub_dir: file.dir.unwrap_or_default(),
            stored_name,
            original_name,
            mime_type,
            bytes,
        })
    }
}

/// Last path segment of a client supplied name.
fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
}

/// Decodes standard base64, accepting a `data:<mime>;base64,` prefix and
/// embedded whitespace.
fn decode_payload(raw: &str) -> Result<Vec<u8>, String> {
    let payload = match raw.trim().strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| "data URL without payload".to_string())?,
        None => raw,
    };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err("empty payload".to_string());
    }

    STANDARD.decode(compact).map_err(|e| e.to_string())
}

fn timestamped_name(original: &str, millis: i64) -> String {
    format!("{millis}-{}", WHITESPACE.replace_all(original, "_"))
}

fn unique_name(original: &str, mime_type: &str) -> String {
    let extension = original
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| extension_for_mime(mime_type).map(str::to_string));

    match extension {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    }
}
