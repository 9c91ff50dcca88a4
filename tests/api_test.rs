// Integration tests for the one-shot HTTP facade and the WebSocket route

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use grevo::api::{create_app, EnergyAppState, QueryAppState, StatusAppState, WsAppState};
use grevo::config::ApiConfig;
use grevo::site::SiteRegistry;
use grevo::subscription::{BrokerHandle, SubscriptionBroker};
use grevo::telemetry::RandomSynthesizer;
use serde_json::Value;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

fn create_test_app() -> Router {
    let synthesizer = Arc::new(RandomSynthesizer);
    let broker = Arc::new(SubscriptionBroker::new(synthesizer.clone()));
    let (handle, _events) = BrokerHandle::channel();

    create_app(
        Arc::new(QueryAppState {
            registry: Arc::new(SiteRegistry::builtin()),
        }),
        Arc::new(EnergyAppState {
            synthesizer,
            config: ApiConfig::default(),
        }),
        Arc::new(StatusAppState {
            broker,
            ticks: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }),
        Arc::new(WsAppState {
            broker: handle,
            outbox_capacity: 8,
        }),
    )
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (status, json) = get_json(create_test_app(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_status() {
    let (status, json) = get_json(create_test_app(), "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "running");
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["observers"], 0);
    assert_eq!(json["ticks"], 0);
    assert_eq!(json["deliveryFaults"], 0);
}

#[tokio::test]
async fn test_list_campuses() {
    let (status, json) = get_json(create_test_app(), "/api/campuses").await;

    assert_eq!(status, StatusCode::OK);
    let sites = json.as_array().unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0]["id"], "campus-1");
    assert_eq!(sites[1]["id"], "campus-2");
    assert_eq!(sites[1]["energySources"]["wind"]["enabled"], false);
}

#[tokio::test]
async fn test_get_campus() {
    let (status, json) = get_json(create_test_app(), "/api/campuses/campus-2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Solar Ridge Campus");
    assert_eq!(json["location"]["city"], "SunCity");
}

#[tokio::test]
async fn test_get_campus_not_found() {
    let (status, json) = get_json(create_test_app(), "/api/campuses/campus-9").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Campus not found");
}

#[tokio::test]
async fn test_energy_data_defaults() {
    let (status, json) = get_json(create_test_app(), "/api/energy-data").await;

    assert_eq!(status, StatusCode::OK);
    let samples = json.as_array().unwrap();
    assert_eq!(samples.len(), 10);
    for sample in samples {
        assert_eq!(sample["campusId"], "campus-1");
        assert_eq!(sample["source"], "mock-iot");
        assert_eq!(sample["battery"]["capacity"], 1000);
    }
}

#[tokio::test]
async fn test_energy_data_with_params() {
    let (status, json) =
        get_json(create_test_app(), "/api/energy-data?campusId=campus-2&limit=3").await;

    assert_eq!(status, StatusCode::OK);
    let samples = json.as_array().unwrap();
    assert_eq!(samples.len(), 3);
    assert!(samples.iter().all(|s| s["campusId"] == "campus-2"));
}

#[tokio::test]
async fn test_energy_data_invalid_limit() {
    let (status, _) = get_json(create_test_app(), "/api/energy-data?limit=lots").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_latest_energy_data() {
    let (status, json) =
        get_json(create_test_app(), "/api/energy-data/latest/campus-2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["campusId"], "campus-2");
    let frequency = json["grid"]["frequency"].as_f64().unwrap();
    assert!((49.5..50.5).contains(&frequency));
}

#[tokio::test]
async fn test_latest_energy_data_unknown_site() {
    let (status, json) =
        get_json(create_test_app(), "/api/energy-data/latest/unlisted").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["campusId"], "unlisted");
}

#[tokio::test]
async fn test_cors_headers() {
    let response = create_test_app()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/health")
                .header("Origin", "http://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

// Plain GET without upgrade headers: the WebSocketUpgrade extractor rejects
// it before any session is opened.
#[tokio::test]
async fn test_ws_requires_upgrade() {
    let (status, _) = get_json(create_test_app(), "/api/ws").await;
    assert!(status.is_client_error());
}
