//! Graceful shutdown handling.
//!
//! Provides signal handling for clean server shutdown.

use tokio::{signal, sync::watch};

/// Wait for a shutdown signal (Ctrl-C or SIGTERM).
///
/// On Unix systems, it also handles SIGTERM for container environments.
#[allow(clippy::expect_used)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Fans a single shutdown trigger out to every subscriber.
///
/// Receivers observe `true` once [`shutdown`](Self::shutdown) is called,
/// including receivers created afterwards.
pub struct ShutdownCoordinator {
    notify: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(false);
        Self { notify }
    }

    /// Subscribe to shutdown notifications.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.notify.subscribe()
    }

    /// Trigger shutdown.
    pub fn shutdown(&self) {
        self.notify.send_replace(true);
    }

    /// Whether shutdown has been triggered.
    pub fn is_shutting_down(&self) -> bool {
        *self.notify.borrow()
    }

    /// Wait for a shutdown signal and trigger the coordinator.
    pub async fn wait_for_signal(&self) {
        shutdown_signal().await;
        self.shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
