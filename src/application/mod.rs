//! Application layer with use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ImageQuery, UploadFile, UploadRequest};
pub use use_cases::{ServeImageUseCase, UploadFilesUseCase, UploadPolicy};
