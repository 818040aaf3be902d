//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::domain::entities::DEFAULT_TTL_SECS;
use crate::infrastructure::image::{DEFAULT_PLACEHOLDER_WIDTH, DEFAULT_QUALITY};

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Service configuration, loaded from TOML and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage directories.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rendered variant cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Image rendering defaults.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Post-write hooks.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// First path segment of the image route.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,

    /// CORS origins; entries starting with `regex:` are patterns.
    /// Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            route_prefix: default_route_prefix(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Source directories, searched in order.
    #[serde(default = "default_directories")]
    pub directories: Vec<PathBuf>,

    /// Upload root.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest accepted upload, in decoded bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Keep the client's file name (prefixed with a timestamp) instead of a UUID.
    #[serde(default)]
    pub upload_original_name: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directories: default_directories(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            upload_original_name: false,
        }
    }
}

/// Disk cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory, created on first write.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Entry lifetime in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Seconds between expired entry sweeps. Zero disables the sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// `Cache-Control: max-age` sent with images.
    #[serde(default = "default_max_age_header_secs")]
    pub max_age_header_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_age_header_secs: default_max_age_header_secs(),
        }
    }
}

/// Image rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Quality used by lossy formats when the request names none.
    #[serde(default = "default_quality")]
    pub default_quality: u8,

    /// Placeholder width when the request names no dimension.
    #[serde(default = "default_placeholder_width")]
    pub placeholder_width: u32,

    /// Placeholder height when the request names no dimension.
    /// Defaults to the width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_height: Option<u32>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            default_quality: default_quality(),
            placeholder_width: default_placeholder_width(),
            placeholder_height: None,
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Shell command run after files are written, e.g. `pm2 reload 0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_command: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_route_prefix() -> String {
    "assets".to_string()
}

fn default_directories() -> Vec<PathBuf> {
    vec![PathBuf::from("storage")]
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("storage")
}

const fn default_max_upload_bytes() -> u64 {
    500 * 1024 * 1024
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache-local/images")
}

const fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

const fn default_sweep_interval_secs() -> u64 {
    600
}

const fn default_max_age_header_secs() -> u64 {
    3600
}

const fn default_quality() -> u8 {
    DEFAULT_QUALITY
}

const fn default_placeholder_width() -> u32 {
    DEFAULT_PLACEHOLDER_WIDTH
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(host) = args.host {
            self.server.host = host;
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(cache_dir) = args.cache_dir {
            self.cache.dir = cache_dir;
        }
        if let Some(ttl) = args.cache_ttl {
            self.cache.ttl_secs = ttl;
        }
        if !args.storage_dirs.is_empty() {
            self.storage.directories = args.storage_dirs;
        }
    }

    /// Returns the `host:port` listen address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            images: ImagesConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}
