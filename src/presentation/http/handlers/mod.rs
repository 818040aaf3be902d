//! HTTP handlers.

pub mod files;
pub mod images;
pub mod system;
