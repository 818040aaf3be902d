//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image caching, transformation and placeholders.
pub mod image;
/// Post-write reload hook.
pub mod notifications;
/// Filesystem adapters.
pub mod storage;

pub use config::{AppConfig, CliArgs, ConfigError, ConfigManager, LogLevel};
pub use image::{DiskImageCache, ImageTransformer};
pub use notifications::ProcessReloadNotifier;
pub use storage::{DirectoryLocator, LocalFileStore};
