//! Civic Intel Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use civic_intel_config::{load_settings, Settings, StorageConfig};
use civic_intel_persistence::{MongoConfig, VoicemailStore};
use civic_intel_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first (need observability settings for tracing init)
    let env = std::env::var("CIVIC_INTEL_ENV").ok();
    let config = load_settings(env.as_deref())?;

    init_tracing(&config);

    tracing::info!("Starting Civic Intel Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(env = ?env, "Loaded configuration");

    if config.observability.metrics_enabled {
        match init_metrics() {
            Ok(_) => tracing::info!("Initialized Prometheus metrics at /metrics"),
            Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
        }
    }

    // One client for the life of the process, shared by every request
    let store = civic_intel_persistence::init(mongo_config(&config.storage)).await?;
    match store.ping().await {
        Ok(()) => tracing::info!("Connected to MongoDB"),
        Err(e) => tracing::error!(error = %e, "MongoDB not reachable; queries will fail until it is"),
    }

    let state = AppState::new(config.clone(), Arc::new(store))?;
    tracing::info!("Initialized application state");

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn mongo_config(storage: &StorageConfig) -> MongoConfig {
    MongoConfig {
        uri: storage.uri.clone(),
        database: storage.database.clone(),
        collection: storage.collection.clone(),
        app_name: storage.app_name.clone(),
        connect_timeout_ms: storage.connect_timeout_ms,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize console logging
///
/// `RUST_LOG` takes precedence over `observability.log_level`.
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = &config.observability.log_level;
            format!("civic_intel={},tower_http=debug", level).into()
        });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
