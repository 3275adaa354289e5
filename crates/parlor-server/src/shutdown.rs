//! Stop signal shared by the room loop and the HTTP listener.

use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the server's [`CancellationToken`].
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// A coordinator whose token has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that fires when shutdown starts.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Fire the token, then give `handles` up to `timeout` (10s if `None`).
    pub async fn graceful_shutdown(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        self.token.cancel();
        info!(tasks = handles.len(), ?timeout, "shutting down");

        if tokio::time::timeout(timeout, join_all(handles)).await.is_err() {
            warn!(?timeout, "tasks still running after shutdown timeout");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn graceful_shutdown_fires_every_token_and_waits() {
        let coord = ShutdownCoordinator::new();
        let seen = coord.token();
        let worker = coord.token();
        let handle = tokio::spawn(async move {
            worker.cancelled().await;
        });
        assert!(!seen.is_cancelled());

        coord.graceful_shutdown(vec![handle], None).await;
        assert!(seen.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_shutdown_gives_up_after_timeout() {
        let coord = ShutdownCoordinator::new();
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        });

        coord
            .graceful_shutdown(vec![handle], Some(Duration::from_millis(100)))
            .await;
        assert!(coord.token().is_cancelled());
    }
}
