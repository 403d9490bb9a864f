//! Test harness for crypto service integration tests.
//!
//! Starts the real gRPC server on an ephemeral port, backed by an
//! [`InMemoryCryptoStore`] the test can inspect and fault-inject.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::{net::SocketAddr, sync::Arc};

use cryptovote_proto::proto::{
    AddLikeRequest, CreateCryptoRequest, Crypto, crypto_service_client::CryptoServiceClient,
};
use cryptovote_server::shutdown::ShutdownCoordinator;
use cryptovote_service::CryptoServer;
use cryptovote_store::InMemoryCryptoStore;
use tonic::transport::Channel;

/// A running server plus its backing store.
pub struct TestServer {
    /// Address the server listens on.
    pub addr: SocketAddr,
    /// Store shared with the server.
    pub store: Arc<InMemoryCryptoStore>,
    coordinator: ShutdownCoordinator,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Starts a server on `127.0.0.1` with an OS-assigned port.
    pub async fn start() -> Self {
        let store = Arc::new(InMemoryCryptoStore::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let coordinator = ShutdownCoordinator::new();
        let server = CryptoServer::builder()
            .store(store.clone())
            .addr(addr)
            .shutdown_rx(coordinator.subscribe())
            .build();

        let server_handle = tokio::spawn(async move {
            if let Err(e) = server.serve_with_listener(listener).await {
                panic!("test server failed: {e}");
            }
        });

        Self { addr, store, coordinator, _server_handle: server_handle }
    }

    /// Endpoint URL for clients.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Connects a generated client.
    pub async fn client(&self) -> CryptoServiceClient<Channel> {
        CryptoServiceClient::connect(self.endpoint()).await.unwrap()
    }

    /// Stops the server.
    pub fn shutdown(&self) {
        self.coordinator.shutdown();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.coordinator.shutdown();
    }
}

/// Creates a record and returns it.
pub async fn create(
    client: &mut CryptoServiceClient<Channel>,
    name: &str,
    description: &str,
) -> Crypto {
    client
        .create_crypto(CreateCryptoRequest {
            name: name.to_owned(),
            description: description.to_owned(),
        })
        .await
        .unwrap()
        .into_inner()
        .crypto
        .unwrap()
}

/// Adds `count` likes to the record.
pub async fn like_n(client: &mut CryptoServiceClient<Channel>, id: &str, count: usize) -> Crypto {
    let mut last = None;
    for _ in 0..count {
        let response = client.add_like(AddLikeRequest { id: id.to_owned() }).await.unwrap();
        last = response.into_inner().crypto;
    }
    last.unwrap()
}
