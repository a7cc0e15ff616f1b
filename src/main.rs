//! Batch Ingestion Engine
//!
//! Accepts identifier submissions over HTTP and processes them in fixed-size
//! batches against a rate-limited downstream:
//! - Priority-ordered dispatch across ingestions
//! - Strictly sequential batches within an ingestion
//! - Fixed delay between batches of the same ingestion

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use telemetry::{health, init_tracing_from_env};
use worker::{
    BatchProcessingEngine, EngineConfig, IngestionService, IngestionStore, PriorityWorkQueue,
    SimulatedDownstream, WorkerScheduler,
};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    engine: EngineConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            engine: EngineConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Batch Ingestion Engine v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        batch_size = config.engine.effective_batch_size(),
        batch_interval_ms = config.engine.batch_interval_ms,
        worker_concurrency = config.engine.worker_concurrency,
        downstream_latency_ms = config.engine.downstream_latency_ms,
        failing_ids = ?config.engine.failing_ids,
        "Loaded engine config"
    );

    let store = Arc::new(IngestionStore::new());
    let queue = Arc::new(PriorityWorkQueue::new());
    let downstream = Arc::new(SimulatedDownstream::new(config.engine.simulator_config()));

    // Start workers before accepting traffic
    let engine = BatchProcessingEngine::new(store.clone(), downstream);
    let scheduler = Arc::new(WorkerScheduler::new(
        config.engine.worker_config(),
        engine,
        queue.clone(),
    ));
    let worker_handles = scheduler.start();

    let service = Arc::new(IngestionService::new(
        store,
        queue,
        config.engine.effective_batch_size(),
    ));
    let app = router(AppState::new(service));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");

    // In-flight batches are abandoned; state is in memory only
    for handle in worker_handles {
        handle.abort();
    }
    health().workers.set_unhealthy("Shut down");

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
///
/// Environment keys use the `INGESTION__` prefix and `__` for nesting, e.g.
/// `INGESTION__ENGINE__BATCH_INTERVAL_MS=1000`.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("INGESTION")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("engine.failing_ids"),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
