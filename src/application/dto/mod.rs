//! Data transfer objects for the application layer.

mod image_dto;
mod upload_dto;

pub use image_dto::ImageQuery;
pub use upload_dto::{UploadFile, UploadRequest};
