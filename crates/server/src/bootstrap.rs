//! Server bootstrap.
//!
//! Connects the document store and assembles the gRPC server around it.

use std::sync::Arc;

use cryptovote_service::CryptoServer;
use cryptovote_store::{MongoCryptoStore, StoreError};
use tokio::sync::watch;

use crate::config::Config;

/// Error type for bootstrap operations.
#[derive(Debug)]
pub enum BootstrapError {
    /// Failed to connect to or ping the database.
    Store(StoreError),
}

impl std::fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BootstrapError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BootstrapError::Store(e) => Some(e),
        }
    }
}

/// Bootstrapped server components.
pub struct BootstrappedServer {
    /// Store client, kept so it can be closed after the server drains.
    pub store: MongoCryptoStore,
    /// The configured gRPC server.
    pub server: CryptoServer,
}

/// Connects the store and builds the server.
///
/// Fails if the database is unreachable or does not answer a ping.
pub async fn bootstrap_server(
    config: &Config,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<BootstrappedServer, BootstrapError> {
    let store =
        MongoCryptoStore::connect(&config.mongo_config()).await.map_err(BootstrapError::Store)?;

    let server = CryptoServer::builder()
        .store(Arc::new(store.clone()))
        .addr(config.listen_addr())
        .max_concurrent(config.max_concurrent)
        .timeout_secs(config.timeout_secs)
        .shutdown_rx(shutdown_rx)
        .build();

    Ok(BootstrappedServer { store, server })
}
