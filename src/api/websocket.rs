use crate::subscription::{BrokerHandle, ConnectionManager, ObserverSession};
use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state for WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub broker: BrokerHandle,
    /// Per-observer delivery queue depth
    pub outbox_capacity: usize,
}

/// GET /api/ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Create WebSocket router
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .with_state(state)
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>) {
    // One observer session per connection
    let (session, inbox) =
        match ObserverSession::connect(state.broker.clone(), state.outbox_capacity) {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Failed to open observer session");
                return;
            }
        };

    ConnectionManager::new(session).handle(socket, inbox).await;
}
