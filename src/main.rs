mod api;
mod catalog;
mod config;
mod model;
mod normalizer;
mod parser;
mod source;
mod storage;
mod utils;

use api::{ApiKeyAuth, AppState, create_router};
use catalog::{PriceCatalog, SharedCatalog};
use config::{AppConfig, load_config};
use source::{PriceSource, source_for};
use storage::SqliteStorage;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    // Initialize logging (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    let refresh_notify = Arc::new(Notify::new());
    let timeout = Duration::from_secs(config.http_timeout_seconds);
    let catalog = match source_for(&config.price_list, timeout) {
        Ok(source) => {
            let source: Arc<dyn PriceSource> = Arc::from(source);
            let loaded = catalog::load(source.as_ref()).await;
            if loaded.is_empty() {
                warn!("Price catalog is empty; searches will return nothing");
            }
            let shared = SharedCatalog::new(loaded);
            tokio::spawn(refresh_loop(
                source,
                shared.clone(),
                config.refresh_interval_seconds,
                refresh_notify.clone(),
            ));
            shared
        }
        Err(e) => {
            warn!("Price list source unavailable, starting with an empty catalog: {}", e);
            SharedCatalog::new(PriceCatalog::empty())
        }
    };

    if config.inbox_api_keys.is_empty() {
        warn!("No inbox API keys configured; /inbox and /refresh will reject every request");
    }

    let router = create_router(AppState {
        catalog,
        storage,
        auth: ApiKeyAuth::new(config.inbox_api_keys.clone()),
        refresh_notify,
    });

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Cannot bind {}: {}", config.bind_addr, e);
            return;
        }
    };
    info!("HTTP API listening on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    info!("Shut down.");
}

/// Reloads the price list on the configured interval or on manual request,
/// swapping in the new catalog. A failed reload keeps the current catalog.
async fn refresh_loop(
    source: Arc<dyn PriceSource>,
    catalog: SharedCatalog,
    interval_seconds: Option<u64>,
    refresh_notify: Arc<Notify>,
) {
    loop {
        match interval_seconds {
            Some(secs) => {
                tokio::select! {
                    _ = sleep(Duration::from_secs(secs)) => {
                        info!("Refresh timer triggered.");
                    }
                    _ = refresh_notify.notified() => {
                        info!("Manual refresh triggered.");
                    }
                }
            }
            None => {
                refresh_notify.notified().await;
                info!("Manual refresh triggered.");
            }
        }

        match catalog::reload(source.as_ref(), &catalog).await {
            Ok(entries) => info!("Price list reloaded: {} entries", entries),
            Err(e) => {
                warn!("Price list reload from {} failed, keeping current catalog: {}", source.describe(), e);
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
