//! Domain error types.

mod image_error;
mod storage_error;
mod upload_error;

pub use image_error::ImageError;
pub use storage_error::StorageError;
pub use upload_error::UploadError;
