//! Use case implementations.

mod serve_image_use_case;
mod upload_files_use_case;

pub use serve_image_use_case::ServeImageUseCase;
pub use upload_files_use_case::{UploadFilesUseCase, UploadPolicy};
