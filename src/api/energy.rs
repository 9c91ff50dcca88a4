use crate::config::ApiConfig;
use crate::telemetry::{Synthesizer, TelemetrySample};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Shared state for one-shot telemetry queries
pub struct EnergyAppState {
    pub synthesizer: Arc<dyn Synthesizer>,
    pub config: ApiConfig,
}

/// Query parameters for sample batches
#[derive(Deserialize)]
pub struct EnergyDataParams {
    /// Site to synthesize for (default: api.default_site_id)
    #[serde(rename = "campusId")]
    pub campus_id: Option<String>,
    /// Number of samples (default: api.default_limit, max: api.max_limit)
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create energy data router
pub fn create_energy_router(state: Arc<EnergyAppState>) -> Router {
    Router::new()
        .route("/api/energy-data", get(get_energy_data))
        .route("/api/energy-data/latest/:campus_id", get(get_latest))
        .with_state(state)
}

/// GET /api/energy-data - Batch of fresh samples
///
/// Site ids are not checked against the catalog.
async fn get_energy_data(
    State(state): State<Arc<EnergyAppState>>,
    Query(params): Query<EnergyDataParams>,
) -> Result<Json<Vec<TelemetrySample>>, EnergyError> {
    let site_id = params
        .campus_id
        .unwrap_or_else(|| state.config.default_site_id.clone());
    let limit = params
        .limit
        .unwrap_or(state.config.default_limit)
        .min(state.config.max_limit);

    let samples = (0..limit)
        .map(|_| synthesize(state.synthesizer.as_ref(), &site_id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(samples))
}

/// GET /api/energy-data/latest/:campus_id - One fresh sample
async fn get_latest(
    State(state): State<Arc<EnergyAppState>>,
    Path(campus_id): Path<String>,
) -> Result<Json<TelemetrySample>, EnergyError> {
    Ok(Json(synthesize(state.synthesizer.as_ref(), &campus_id)?))
}

fn synthesize(synthesizer: &dyn Synthesizer, site_id: &str) -> Result<TelemetrySample, EnergyError> {
    synthesizer.synthesize(site_id, Utc::now()).map_err(|e| {
        warn!(site_id = %site_id, error = %e, "Synthesis failed");
        EnergyError::Unavailable
    })
}

#[derive(Debug)]
enum EnergyError {
    Unavailable,
}

impl IntoResponse for EnergyError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            EnergyError::Unavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Telemetry source unavailable")
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}
