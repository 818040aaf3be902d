//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    AppConfig, CacheConfig, ImagesConfig, LogLevel, NotificationsConfig, ServerConfig,
    StorageConfig,
};
pub use args::CliArgs;
pub use storage::{ConfigError, ConfigManager};
