use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

use super::guards::ConnectionGuard;

/// Tracks live connections and broadcasts the shutdown request to them
pub struct ConnectionManager {
    active_connections: Arc<AtomicUsize>,
    connections_closed_tx: watch::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        let (connections_closed_tx, _) = watch::channel(());
        let (shutdown_tx, _) = watch::channel(false);
        Self { active_connections: Arc::new(AtomicUsize::new(0)), connections_closed_tx, shutdown_tx }
    }

    pub fn active(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Register a new connection; it counts as active until the guard drops
    pub fn track(&self) -> ConnectionGuard {
        ConnectionGuard::new(self.active_connections.clone(), self.connections_closed_tx.clone())
    }

    /// Receiver that flips to `true` once shutdown has been requested
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Ask every connection to finish its in-flight requests and close,
    /// then wait up to `grace` for them to do so
    pub async fn shutdown(&self, grace: Duration) {
        let mut closed_rx = self.connections_closed_tx.subscribe();
        self.shutdown_tx.send_replace(true);

        info!(
            active_connections = self.active(),
            "Waiting for active connections to finish (timeout: {}s)",
            grace.as_secs()
        );

        let drained = timeout(grace, async {
            while self.active() > 0 {
                if closed_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;

        match drained {
            Ok(()) => info!("All connections closed, shutdown complete"),
            Err(_) => warn!(
                active_connections = self.active(),
                "Shutdown timeout reached, {} connections still active",
                self.active()
            ),
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
