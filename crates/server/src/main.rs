//! Crypto vote server binary.
//!
//! Serves the `crypto.v1.CryptoService` gRPC API backed by a MongoDB
//! collection.
//!
//! # Usage
//!
//! ```bash
//! # Flags
//! cryptovote-server --api-port 50051 --db-host localhost --db-port 27017 \
//!     --db-name votes --db-collection cryptos
//!
//! # Environment variables (or a .env file)
//! API_PORT=50051 DB_HOST=localhost DB_PORT=27017 DB_NAME=votes \
//! DB_COLLECTION=cryptos cryptovote-server
//! ```

use std::{io::IsTerminal, net::SocketAddr};

use clap::Parser;
use cryptovote_server::{
    bootstrap::{self, BootstrapError},
    config::{Config, LogFormat},
    shutdown::ShutdownCoordinator,
};
use cryptovote_service::{ServeError, metrics::LATENCY_HISTOGRAM_BUCKETS};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Top-level error type for the server binary, wrapping bootstrap and runtime failures.
#[derive(Debug)]
enum ServerError {
    Bootstrap(BootstrapError),
    Metrics(BuildError),
    Server(ServeError),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Bootstrap(e) => write!(f, "bootstrap error: {}", e),
            ServerError::Metrics(e) => write!(f, "metrics exporter error: {}", e),
            ServerError::Server(e) => write!(f, "server error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Populate the environment before clap reads it
    let dotenv = dotenvy::dotenv();

    // Parse CLI args and env vars (clap handles --help and --version)
    let config = Config::parse();

    init_logging(config.log_format);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {},
        Err(e) => tracing::warn!(error = %e, "Could not load .env file"),
    }

    tracing::info!(
        listen_addr = %config.listen_addr(),
        db_uri = %config.mongo_uri(),
        db_name = %config.db_name,
        db_collection = %config.db_collection,
        "Starting crypto vote service"
    );

    if let Some(metrics_addr) = config.metrics_addr {
        init_metrics_exporter(metrics_addr)?;
    }

    let coordinator = ShutdownCoordinator::new();
    let node = bootstrap::bootstrap_server(&config, coordinator.subscribe())
        .await
        .map_err(ServerError::Bootstrap)?;

    let shutdown_handle = tokio::spawn(async move {
        coordinator.wait_for_signal().await;
    });

    tracing::info!("Server ready, accepting connections");
    let server_result = node.server.serve().await;

    // Serve only returns early on error; stop waiting for a signal in that case.
    shutdown_handle.abort();

    node.store.shutdown().await;
    tracing::info!("Store disconnected");

    server_result.map_err(ServerError::Server)?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the logging system.
///
/// Supports three formats:
/// - `Text`: Human-readable format (development)
/// - `Json`: JSON structured logging (production)
/// - `Auto`: JSON for non-TTY stdout, text otherwise
fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = match format {
        LogFormat::Json => true,
        LogFormat::Text => false,
        LogFormat::Auto => !std::io::stdout().is_terminal(),
    };

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry().with(env_filter).with(fmt::layer()).init();
    }
}

/// Initializes the Prometheus metrics exporter.
///
/// Starts an HTTP server that exposes metrics at `/metrics`.
fn init_metrics_exporter(addr: SocketAddr) -> Result<(), ServerError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets(&LATENCY_HISTOGRAM_BUCKETS)
        .map_err(ServerError::Metrics)?
        .install()
        .map_err(ServerError::Metrics)?;

    tracing::info!(metrics_addr = %addr, "Prometheus metrics exporter started");
    Ok(())
}
