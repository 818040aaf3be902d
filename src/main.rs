use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use assetd::application::use_cases::{ServeImageUseCase, UploadFilesUseCase, UploadPolicy};
use assetd::domain::ports::NotificationPort;
use assetd::infrastructure::{
    AppConfig, CliArgs, ConfigManager, DirectoryLocator, DiskImageCache, ImageTransformer,
    LocalFileStore, ProcessReloadNotifier,
};
use assetd::presentation::http::{AppState, build_router};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let args = CliArgs::parse();

    let manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(_) if args.config.is_some() => ConfigManager::with_dir(".".into()),
        Err(e) => return Err(e).wrap_err("cannot locate the configuration directory"),
    };
    let mut config = manager
        .load_config(args.config.as_deref())
        .wrap_err("failed to load configuration")?;
    config.merge_with_args(args);

    Ok(config)
}

/// Periodically deletes expired variants so unused entries do not pile up.
fn spawn_cache_sweeper(cache: Arc<DiskImageCache>, interval_secs: u64) {
    if interval_secs == 0 {
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = cache.purge_expired().await;
            debug!(removed, "Cache sweep finished");
        }
    });
}

fn build_state(config: &AppConfig) -> (AppState, Arc<DiskImageCache>) {
    let cache = Arc::new(DiskImageCache::new(
        config.cache.dir.clone(),
        config.cache.ttl_secs,
    ));
    let locator = Arc::new(DirectoryLocator::new(config.storage.directories.clone()));
    let transformer = Arc::new(ImageTransformer::new(
        config.images.default_quality,
        config.images.placeholder_width,
        config.images.placeholder_height,
    ));
    let store = Arc::new(LocalFileStore::new(
        config.storage.directories.clone(),
        config.storage.upload_dir.clone(),
    ));
    let policy = UploadPolicy {
        max_bytes: config.storage.max_upload_bytes,
        keep_original_name: config.storage.upload_original_name,
    };

    let mut images = ServeImageUseCase::new(cache.clone(), locator, transformer);
    let mut uploads = UploadFilesUseCase::new(store.clone(), policy);

    if let Some(notifier) = ProcessReloadNotifier::from_config(&config.notifications) {
        info!(command = notifier.command(), "Reload hook enabled");
        let notifier: Arc<dyn NotificationPort> = Arc::new(notifier);
        images = images.with_notifier(notifier.clone());
        uploads = uploads.with_notifier(notifier);
    }

    let state = AppState {
        images,
        uploads,
        storage: store,
        max_age_secs: config.cache.max_age_header_secs,
    };
    (state, cache)
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received terminate signal"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_logging(&config)?;

    info!(
        version = assetd::VERSION,
        directories = ?config.storage.directories,
        cache_dir = %config.cache.dir.display(),
        ttl_secs = config.cache.ttl_secs,
        "Starting assetd"
    );

    let (state, cache) = build_state(&config);
    spawn_cache_sweeper(cache, config.cache.sweep_interval_secs);

    let router = build_router(state, &config);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("failed to bind {address}"))?;

    info!(address = %address, prefix = %config.server.route_prefix, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
