//! gRPC server for the crypto vote service.
//!
//! Exposes `crypto.v1.CryptoService` plus gRPC server reflection, behind a
//! tower stack that limits concurrency, sheds load and enforces a per-request
//! timeout.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use cryptovote_proto::proto::crypto_service_server::CryptoServiceServer;
use cryptovote_store::CryptoStore;
use snafu::{ResultExt, Snafu};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tower::ServiceBuilder;

use crate::services::CryptoServiceImpl;

/// Errors that stop the gRPC server.
#[derive(Debug, Snafu)]
pub enum ServeError {
    /// The listen address could not be bound.
    #[snafu(display("Failed to bind {addr}: {source}"))]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// I/O error.
        source: std::io::Error,
    },

    /// The reflection service could not be built from the descriptor set.
    #[snafu(display("Failed to build reflection service: {source}"))]
    Reflection {
        /// Reflection builder error.
        source: tonic_reflection::server::Error,
    },

    /// The transport failed while serving.
    #[snafu(display("gRPC transport error: {source}"))]
    Transport {
        /// Transport error.
        source: tonic::transport::Error,
    },
}

/// The crypto vote gRPC server.
///
/// Stops when `true` is sent on `shutdown_rx`; without a receiver it serves
/// until the process exits.
#[derive(bon::Builder)]
pub struct CryptoServer {
    /// Store shared by all handlers.
    store: Arc<dyn CryptoStore>,
    /// Server address.
    addr: SocketAddr,
    /// Max concurrent requests per connection.
    #[builder(default = 100)]
    max_concurrent: usize,
    /// Request timeout in seconds.
    #[builder(default = 30)]
    timeout_secs: u64,
    /// Shutdown signal receiver. When `true` is sent, the server stops.
    shutdown_rx: Option<tokio::sync::watch::Receiver<bool>>,
}

impl CryptoServer {
    /// Binds the configured address and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the transport fails.
    pub async fn serve(self) -> Result<(), ServeError> {
        let addr = self.addr;
        let listener = TcpListener::bind(addr).await.context(BindSnafu { addr })?;
        self.serve_with_listener(listener).await
    }

    /// Serves on an already-bound listener until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the reflection service cannot be built or the
    /// transport fails.
    pub async fn serve_with_listener(self, listener: TcpListener) -> Result<(), ServeError> {
        let Self { store, addr, max_concurrent, timeout_secs, shutdown_rx } = self;

        tracing::info!(max_concurrent, timeout_secs, "Configuring request limits");

        let layer = ServiceBuilder::new()
            // Limit concurrent requests per connection
            .concurrency_limit(max_concurrent)
            // Reject new requests when overloaded
            .load_shed()
            .timeout(Duration::from_secs(timeout_secs))
            .into_inner();

        let crypto_service = CryptoServiceImpl::builder().store(store).build();

        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(cryptovote_proto::FILE_DESCRIPTOR_SET)
            .build_v1()
            .context(ReflectionSnafu)?;

        let local_addr = listener.local_addr().unwrap_or(addr);
        tracing::info!(addr = %local_addr, "Starting crypto gRPC server");

        let shutdown = async move {
            match shutdown_rx {
                Some(mut rx) => {
                    let _ = rx.wait_for(|v| *v).await;
                },
                None => std::future::pending::<()>().await,
            }
            tracing::info!("Shutdown signal received, stopping gRPC server");
        };

        Server::builder()
            .layer(layer)
            .add_service(CryptoServiceServer::new(crypto_service))
            .add_service(reflection_service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
            .context(TransportSnafu)?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}
