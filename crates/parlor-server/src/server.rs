//! Router, shared state, and server startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use parlor_hub::{Hub, HubConfig, HubHandle};
use parlor_settings::{ParlorSettings, RoomSettings, ServerSettings};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::ServerError;
use crate::health::{self, HealthResponse};
use crate::metrics;
use crate::pages;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket;

/// Admission limits for `/room`.
#[derive(Clone, Copy, Debug)]
pub struct ConnectionLimits {
    /// Members admitted at once.
    pub max_connections: usize,
    /// Largest inbound `WebSocket` message, in bytes.
    pub max_message_size: usize,
}

impl From<&ServerSettings> for ConnectionLimits {
    fn from(server: &ServerSettings) -> Self {
        Self {
            max_connections: server.max_connections,
            max_message_size: server.max_message_size,
        }
    }
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The room.
    pub hub: HubHandle,
    /// `/room` admission limits.
    pub limits: ConnectionLimits,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
    /// When the server started.
    pub start_time: Instant,
    /// Renders `/metrics`; `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.assets_dir);

    Router::new()
        .route("/room", get(websocket::room_handler))
        .route("/chat", get(pages::chat_page))
        .route("/login", get(pages::login_page))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest_service("/assets", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn hub_config(room: &RoomSettings) -> HubConfig {
    HubConfig {
        intake_capacity: room.intake_capacity,
        mailbox_capacity: room.mailbox_capacity,
    }
}

/// Bind the listener and start the room and HTTP tasks.
pub async fn start(
    settings: &ParlorSettings,
    metrics: Option<PrometheusHandle>,
) -> Result<ServerHandle, ServerError> {
    let listener = TcpListener::bind(settings.server.listen_addr()).await?;
    let local_addr = listener.local_addr()?;

    let shutdown = ShutdownCoordinator::new();
    let (hub, hub_handle) = Hub::new(&hub_config(&settings.room));
    let hub_task = tokio::spawn(hub.run(shutdown.token()));

    let state = AppState {
        hub: hub_handle.clone(),
        limits: ConnectionLimits::from(&settings.server),
        assets_dir: PathBuf::from(&settings.http.assets_dir),
        start_time: Instant::now(),
        metrics,
    };
    let router = build_router(state);

    let stop = shutdown.token();
    let server_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(stop.cancelled_owned())
            .await
        {
            error!(error = %e, "http server failed");
        }
    });

    info!(%local_addr, "parlor server listening");

    Ok(ServerHandle {
        local_addr,
        hub: hub_handle,
        shutdown,
        tasks: vec![hub_task, server_task],
    })
}

/// A running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    hub: HubHandle,
    shutdown: ShutdownCoordinator,
    tasks: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// The bound address (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The room behind `/room`.
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Stop accepting, stop the room, and wait for both tasks.
    pub async fn stop(self, timeout: Option<Duration>) {
        self.shutdown.graceful_shutdown(self.tasks, timeout).await;
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.hub.member_count(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => metrics::render(handle).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// State over a hub that is never run, serving assets from `dir`.
#[cfg(test)]
pub(crate) fn test_state(dir: &std::path::Path) -> AppState {
    let (_hub, handle) = Hub::new(&HubConfig::default());
    AppState {
        hub: handle,
        limits: ConnectionLimits::from(&ServerSettings::default()),
        assets_dir: dir.to_path_buf(),
        start_time: Instant::now(),
        metrics: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get(app: Router, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(req).await.unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let dir = tempfile::tempdir().unwrap();
        let resp = get(build_router(test_state(dir.path())), "/health").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 0);
        assert!(parsed["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn room_without_upgrade_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let resp = get(build_router(test_state(dir.path())), "/room").await;
        assert!(resp.status().is_client_error(), "got {}", resp.status());
    }

    #[tokio::test]
    async fn metrics_without_recorder_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp = get(build_router(test_state(dir.path())), "/metrics").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_renders_from_handle() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = test_state(dir.path());
        state.metrics = Some(
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle(),
        );
        let resp = get(build_router(state), "/metrics").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn assets_are_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        let resp = get(build_router(test_state(dir.path())), "/assets/style.css").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp = get(build_router(test_state(dir.path())), "/nonexistent").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn limits_follow_settings() {
        let server = ServerSettings {
            max_connections: 3,
            max_message_size: 99,
            ..ServerSettings::default()
        };
        let limits = ConnectionLimits::from(&server);
        assert_eq!(limits.max_connections, 3);
        assert_eq!(limits.max_message_size, 99);
    }

    #[test]
    fn hub_config_follows_room_settings() {
        let config = hub_config(&RoomSettings {
            intake_capacity: 7,
            mailbox_capacity: 5,
        });
        assert_eq!(config.intake_capacity, 7);
        assert_eq!(config.mailbox_capacity, 5);
    }
}
