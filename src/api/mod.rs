// HTTP and WebSocket APIs

pub mod energy;
pub mod health;
pub mod query;
pub mod websocket;

pub use energy::{create_energy_router, EnergyAppState};
pub use health::{create_health_router, StatusAppState};
pub use query::{create_query_router, QueryAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// All routers merged behind a permissive CORS layer
pub fn create_app(
    query: Arc<QueryAppState>,
    energy: Arc<EnergyAppState>,
    status: Arc<StatusAppState>,
    ws: Arc<WsAppState>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .merge(create_query_router(query))
        .merge(create_energy_router(energy))
        .merge(create_health_router(status))
        .merge(create_ws_router(ws))
        .layer(cors)
}
