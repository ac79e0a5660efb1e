mod nearby;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use musala_core::health::HealthChecker;
use musala_mosques::{ErrorResponse, NearbySearchEngine};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::backend::Backend;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<NearbySearchEngine<Backend>>,
    pub health: Arc<HealthChecker>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metrics", get(metrics_export))
        .route("/mosques/nearby", get(nearby::find_nearby))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "PocketMusala API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.health.run();
    let status = if report.status.is_operational() {
        StatusCode::OK
    } else {
        tracing::warn!(failed = report.failed_checks().len(), "health check: store unavailable");
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

async fn metrics_export() -> impl IntoResponse {
    Json(musala_telemetry::metrics().export_json())
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::bare("Endpoint not found")))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown error".to_string()
    };
    tracing::error!(%message, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error", message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StoreHealth;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use musala_core::config::SearchConfig;
    use musala_firestore::{FirestoreConfig, FirestoreStore, RetryConfig};
    use musala_mosques::{MemoryStore, NearbyMosquesResponse};
    use std::time::Duration;
    use serde_json::Value;
    use tower::ServiceExt;

    fn memory_app(store: MemoryStore) -> Router {
        let backend = Backend::Memory(Arc::new(store));
        let health = HealthChecker::new().add_check(StoreHealth::new(backend.clone(), "mosques"));
        build_app(AppState {
            engine: Arc::new(NearbySearchEngine::new(backend, SearchConfig::default())),
            health: Arc::new(health),
        })
    }

    fn seeded_app() -> Router {
        let store = MemoryStore::new()
            .with_document(
                "mosques",
                "haram",
                json!({
                    "communityName": "Masjid al-Haram",
                    "location": {"latitude": 21.4225, "longitude": 39.8262, "address": "Mecca"}
                }),
            )
            .with_document(
                "mosques",
                "near",
                json!({
                    "communityName": "Nearby Masjid",
                    "location": {"latitude": 21.45, "longitude": 39.85}
                }),
            )
            .with_document(
                "mosques",
                "medina",
                json!({
                    "communityName": "Al-Masjid an-Nabawi",
                    "location": {"latitude": 24.4672, "longitude": 39.6112}
                }),
            )
            .with_document("mosques", "broken", json!({"communityName": "No location"}));
        memory_app(store)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json parse"))
    }

    #[tokio::test]
    async fn root_reports_name_and_version() {
        let (status, json) = get_json(seeded_app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "PocketMusala API");
        assert_eq!(json["version"], "1.0.0");
    }

    #[tokio::test]
    async fn health_is_healthy_with_memory_store() {
        let (status, json) = get_json(seeded_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["checks"][0]["details"]["backend"], "memory");
        assert_eq!(json["checks"][0]["details"]["documents"], "4");
    }

    #[tokio::test]
    async fn nearby_returns_sorted_camel_case_results() {
        let (status, json) = get_json(seeded_app(), "/mosques/nearby?lat=21.4225&lng=39.8262&radiusKm=10").await;
        assert_eq!(status, StatusCode::OK);

        let response: NearbyMosquesResponse = serde_json::from_value(json.clone()).unwrap();
        let ids: Vec<_> = response.mosques.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["haram", "near"]);

        let first = &json["mosques"][0];
        assert_eq!(first["communityName"], "Masjid al-Haram");
        assert_eq!(first["thumbnail"]["url"], "");
        assert_eq!(first["verificationStatus"], "Unverified");
        assert_eq!(first["calculationParameters"]["method"], "MoonSighting");
    }

    #[tokio::test]
    async fn nearby_uses_default_radius() {
        let (status, json) = get_json(seeded_app(), "/mosques/nearby?lat=24.4672&lng=39.6112").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["mosques"].as_array().unwrap().len(), 1);
        assert_eq!(json["mosques"][0]["id"], "medina");
    }

    #[tokio::test]
    async fn nearby_rejects_bad_parameters() {
        let (status, json) = get_json(seeded_app(), "/mosques/nearby?lng=39.8").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid latitude");
        assert_eq!(json["message"], "Parameter 'lat' is required and must be a valid number");

        let (status, json) = get_json(seeded_app(), "/mosques/nearby?lat=0&lng=0&radiusKm=101").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid radius");
        assert_eq!(json["message"], "Radius must be between 0 and 100 kilometers");
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty_list() {
        let config = FirestoreConfig::new("http://127.0.0.1:1/v1", "demo")
            .with_retry(RetryConfig::no_retry())
            .with_timeout(Duration::from_secs(2));
        let backend = Backend::Firestore(FirestoreStore::new(config).expect("store"));
        let app = build_app(AppState {
            engine: Arc::new(NearbySearchEngine::new(backend, SearchConfig::default())),
            health: Arc::new(HealthChecker::new()),
        });

        let (status, json) = get_json(app, "/mosques/nearby?lat=21.4&lng=39.8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"mosques": []}));
        assert!(musala_telemetry::metrics().counter("search.failures") >= 1);
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, json) = get_json(seeded_app(), "/mosques/far").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"error": "Endpoint not found"}));
    }

    #[tokio::test]
    async fn metrics_count_searches() {
        let app = seeded_app();
        let (status, _) =
            get_json(app.clone(), "/mosques/nearby?lat=21.4225&lng=39.8262&radiusKm=5").await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get_json(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["counters"]["search.requests"].as_u64().unwrap() >= 1);
        assert!(json["histograms"]["search.duration_ms"]["count"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = seeded_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://app.pocketmusala.com")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn cors_preflight_lists_allowed_methods() {
        let response = seeded_app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/mosques/nearby")
                    .header(header::ORIGIN, "https://app.pocketmusala.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .expect("header value");
        assert!(methods.contains("GET"));
        assert!(methods.contains("DELETE"));
    }

    #[test]
    fn panic_payload_becomes_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
