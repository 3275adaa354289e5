//! `GET /room`: turn an HTTP request into a room member.

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use metrics::counter;
use parlor_hub::{ClientSession, HubHandle};
use tracing::{debug, info, warn};

use crate::errors::AcceptError;
use crate::metrics::{WS_CONNECTIONS_TOTAL, WS_REJECTIONS_TOTAL};
use crate::server::AppState;
use crate::websocket::connection::WsConnection;

/// GET /room
///
/// Rejected upgrades keep the rejection's own status. A full room gets 503.
pub async fn room_handler(
    State(state): State<AppState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let upgrade = match admit(&state, upgrade) {
        Ok(upgrade) => upgrade,
        Err(err) => {
            debug!(error = %err, "room request rejected");
            counter!(WS_REJECTIONS_TOTAL, "reason" => err.reason()).increment(1);
            return err.into_response();
        }
    };

    let hub = state.hub.clone();
    upgrade
        .max_message_size(state.limits.max_message_size)
        .on_failed_upgrade(|error| warn!(%error, "websocket upgrade failed"))
        .on_upgrade(move |socket| serve_socket(socket, hub))
        .into_response()
}

fn admit(
    state: &AppState,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<WebSocketUpgrade, AcceptError> {
    let upgrade = upgrade?;
    if state.hub.member_count() >= state.limits.max_connections {
        return Err(AcceptError::RoomFull);
    }
    Ok(upgrade)
}

async fn serve_socket(socket: WebSocket, hub: HubHandle) {
    counter!(WS_CONNECTIONS_TOTAL).increment(1);

    let session = match ClientSession::open(hub, WsConnection::new(socket)).await {
        Ok(session) => session,
        Err(error) => {
            warn!(%error, "room unavailable, dropping connection");
            return;
        }
    };
    let id = session.id().clone();
    info!(session = %id, "client connected");

    session.run().await;
    info!(session = %id, "client disconnected");
}
