use crate::subscription::SubscriptionBroker;
use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared state for liveness/status
pub struct StatusAppState {
    pub broker: Arc<SubscriptionBroker>,
    pub ticks: Arc<AtomicU64>,
    pub started_at: Instant,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub server: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    /// Seconds since process start
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
    pub observers: usize,
    pub subscriptions: usize,
    pub ticks: u64,
    pub samples_delivered: u64,
    pub delivery_faults: u64,
}

pub fn create_health_router(state: Arc<StatusAppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .with_state(state)
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

/// GET /api/status
async fn status(State(state): State<Arc<StatusAppState>>) -> Json<StatusResponse> {
    let stats = state.broker.stats();

    Json(StatusResponse {
        server: "Grevo Telemetry Backend",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
        observers: stats.observers,
        subscriptions: stats.subscriptions,
        ticks: state.ticks.load(Ordering::Relaxed),
        samples_delivered: stats.samples_delivered,
        delivery_faults: stats.delivery_faults,
    })
}
