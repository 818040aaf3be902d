//! Filesystem adapters for asset sources and uploads.

mod directory_locator;
mod local_file_store;

pub use directory_locator::DirectoryLocator;
pub use local_file_store::{LocalFileStore, sanitize_relative};
