mod file_storage_port;
mod image_cache_port;
mod image_transform_port;
mod notification_port;
mod source_locator_port;

pub use file_storage_port::{FileStoragePort, NewFile};
pub use image_cache_port::{CacheError, CacheResult, ImageCachePort};
pub use image_transform_port::ImageTransformPort;
pub use notification_port::NotificationPort;
pub use source_locator_port::SourceLocatorPort;
