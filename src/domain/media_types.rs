//! MIME type allow-lists and extension lookups.

/// Office and document types accepted for upload.
pub const APPLICATION_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Image types accepted for upload.
pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/tiff",
    "image/bmp",
    "image/svg+xml",
];

/// Audio types. Allow-listed only; never processed.
pub const AUDIO_MIME_TYPES: &[&str] = &["audio/m4a", "audio/mp4", "audio/wav", "audio/x-wav"];

/// Video types. Allow-listed only; never processed.
pub const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-ms-wmv",
];

/// Coarse grouping used by search filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    /// Raster and vector images.
    Image,
    /// PDF and office documents.
    Office,
    /// Audio files.
    Audio,
    /// Video files.
    Video,
}

impl MediaCategory {
    /// Parses a search `type` filter.
    #[must_use]
    pub fn from_filter(filter: &str) -> Option<Self> {
        match filter.trim().to_ascii_lowercase().as_str() {
            "image" | "images" => Some(Self::Image),
            "office" | "document" | "documents" => Some(Self::Office),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Allow-list for this category.
    #[must_use]
    pub const fn mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_MIME_TYPES,
            Self::Office => APPLICATION_MIME_TYPES,
            Self::Audio => AUDIO_MIME_TYPES,
            Self::Video => VIDEO_MIME_TYPES,
        }
    }

    /// Whether `mime` belongs to this category.
    #[must_use]
    pub fn contains(self, mime: &str) -> bool {
        self.mime_types().contains(&mime)
    }
}

/// Whether `mime` may be uploaded.
#[must_use]
pub fn is_upload_allowed(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    [
        MediaCategory::Image,
        MediaCategory::Office,
        MediaCategory::Audio,
        MediaCategory::Video,
    ]
    .iter()
    .any(|category| category.contains(&mime))
}

/// Guesses a MIME type from a file name's extension.
#[must_use]
pub fn mime_from_filename(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "m4a" => "audio/m4a",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "mpeg" | "mpg" => "video/mpeg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Preferred file extension for an allow-listed MIME type.
#[must_use]
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let ext = match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/tiff" => "tiff",
        "image/bmp" => "bmp",
        "image/svg+xml" => "svg",
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "application/vnd.ms-excel" => "xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "application/vnd.ms-powerpoint" => "ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        "audio/m4a" | "audio/mp4" => "m4a",
        "audio/wav" | "audio/x-wav" => "wav",
        "video/mp4" => "mp4",
        "video/mpeg" => "mpeg",
        "video/quicktime" => "mov",
        "video/x-msvideo" => "avi",
        "video/x-ms-wmv" => "wmv",
        _ => return None,
    };
    Some(ext)
}
