//! assetd - An image and file asset server.
//!
//! Serves stored images resized and re-encoded on demand, caching every
//! rendered variant on disk with a per-entry time-to-live. Missing images
//! are replaced by a generated placeholder. Plain files can be uploaded,
//! searched, previewed and listed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for the filesystem and codecs.
pub mod infrastructure;
/// Presentation layer containing the HTTP surface.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "assetd";
