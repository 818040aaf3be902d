//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// MIME allow-lists.
pub mod media_types;
/// Port definitions.
pub mod ports;

pub use entities::{CacheKey, OutputFormat, RenderedImage, TransformRequest};
pub use errors::{ImageError, StorageError, UploadError};
pub use ports::{ImageCachePort, ImageTransformPort, NotificationPort, SourceLocatorPort};
