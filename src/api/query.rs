use crate::site::{Site, SiteRegistry};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for the site catalog API
pub struct QueryAppState {
    pub registry: Arc<SiteRegistry>,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create catalog query router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/api/campuses", get(list_campuses))
        .route("/api/campuses/:id", get(get_campus))
        .with_state(state)
}

/// GET /api/campuses - Full catalog in registry order
async fn list_campuses(State(state): State<Arc<QueryAppState>>) -> Json<Vec<Site>> {
    Json(state.registry.sites().to_vec())
}

/// GET /api/campuses/:id - One site
async fn get_campus(
    State(state): State<Arc<QueryAppState>>,
    Path(id): Path<String>,
) -> Result<Json<Site>, QueryError> {
    let site = state.registry.get_site(&id).ok_or(QueryError::NotFound)?;
    Ok(Json(site.clone()))
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotFound,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "Campus not found"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_state() -> Arc<QueryAppState> {
        Arc::new(QueryAppState {
            registry: Arc::new(SiteRegistry::builtin()),
        })
    }

    #[tokio::test]
    async fn test_list_campuses() {
        let result = list_campuses(State(create_test_state())).await;

        let ids: Vec<&str> = result.0.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["campus-1", "campus-2"]);
    }

    #[tokio::test]
    async fn test_get_campus() {
        let result = get_campus(State(create_test_state()), Path("campus-1".to_string()))
            .await
            .unwrap();

        assert_eq!(result.0.name, "Green Valley Campus");
    }

    #[tokio::test]
    async fn test_get_unknown_campus() {
        let result = get_campus(State(create_test_state()), Path("campus-3".to_string())).await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
