use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "assetd",
    version,
    about = "Image and file asset server with on-the-fly resizing",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "ASSETD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Bind address.
    #[arg(long, env = "ASSETD_HOST")]
    pub host: Option<String>,

    /// Bind port.
    #[arg(short, long, env = "ASSETD_PORT")]
    pub port: Option<u16>,

    /// Rendered image cache directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Cache entry lifetime in seconds.
    #[arg(long, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    /// Source directory, searched in the order given. Repeatable.
    #[arg(long = "storage-dir", value_name = "PATH")]
    pub storage_dirs: Vec<PathBuf>,
}
