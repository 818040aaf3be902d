//! Image handling infrastructure.
//!
//! This module provides:
//! - Disk caching of rendered variants with per-entry expiry
//! - Resize and re-encode pipeline
//! - "Image not found" placeholder rasterization

pub mod disk_cache;
pub mod placeholder;
pub mod transformer;

pub use disk_cache::DiskImageCache;
pub use placeholder::DEFAULT_PLACEHOLDER_WIDTH;
pub use transformer::{DEFAULT_QUALITY, ImageTransformer};
