//! Presentation layer with the HTTP surface.

/// Routes, handlers and response mapping.
pub mod http;
