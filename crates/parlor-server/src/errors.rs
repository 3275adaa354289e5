//! Server error types.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Startup failures.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or inspecting the listener failed.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The Prometheus recorder could not be installed.
    #[error("failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Why a `/room` request did not become a session.
#[derive(Debug, Error)]
pub enum AcceptError {
    /// The request was not a valid `WebSocket` upgrade.
    #[error("websocket upgrade rejected: {0}")]
    Upgrade(#[from] WebSocketUpgradeRejection),
    /// The room already holds `max_connections` members.
    #[error("room is full")]
    RoomFull,
}

impl AcceptError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Upgrade(_) => "upgrade",
            Self::RoomFull => "room_full",
        }
    }
}

impl IntoResponse for AcceptError {
    fn into_response(self) -> Response {
        match self {
            Self::Upgrade(rejection) => rejection.into_response(),
            Self::RoomFull => (StatusCode::SERVICE_UNAVAILABLE, "room is full").into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_full_is_503() {
        let resp = AcceptError::RoomFull.into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(AcceptError::RoomFull.reason(), "room_full");
    }
}
