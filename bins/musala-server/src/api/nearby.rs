//! `GET /mosques/nearby`

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use musala_core::config::SearchConfig;
use musala_geo::Coordinate;
use musala_mosques::{ErrorResponse, NearbyMosquesResponse, SearchRequest};
use musala_telemetry::{metrics, Timer};
use tracing::{debug, error};

use super::AppState;

/// Parses and validates the query string. Checks run in a fixed order and the
/// first failure wins. An unparseable `radiusKm` falls back to the default.
pub(super) fn parse_request(
    params: &HashMap<String, String>,
    config: &SearchConfig,
) -> Result<SearchRequest, ErrorResponse> {
    let number = |key: &str| params.get(key).and_then(|raw| raw.parse::<f64>().ok());

    let Some(lat) = number("lat") else {
        return Err(ErrorResponse::new(
            "Invalid latitude",
            "Parameter 'lat' is required and must be a valid number",
        ));
    };
    let Some(lng) = number("lng") else {
        return Err(ErrorResponse::new(
            "Invalid longitude",
            "Parameter 'lng' is required and must be a valid number",
        ));
    };
    let radius_km = number("radiusKm").unwrap_or(config.default_radius_km);

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ErrorResponse::new(
            "Invalid latitude",
            "Latitude must be between -90 and 90",
        ));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ErrorResponse::new(
            "Invalid longitude",
            "Longitude must be between -180 and 180",
        ));
    }
    // NaN fails both comparisons and is rejected here
    if !(radius_km > 0.0 && radius_km <= config.max_radius_km) {
        return Err(ErrorResponse::new(
            "Invalid radius",
            format!(
                "Radius must be between 0 and {} kilometers",
                config.max_radius_km
            ),
        ));
    }

    Ok(SearchRequest {
        center: Coordinate::new(lat, lng),
        radius_km,
    })
}

pub(super) async fn find_nearby(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = match parse_request(&params, state.engine.config()) {
        Ok(request) => request,
        Err(body) => {
            debug!(error = %body.error, "Rejected nearby search");
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let registry = metrics();
    registry.increment("search.requests");
    let timer = Timer::start("search.duration_ms");

    // Store failures degrade to an empty list; callers see 200 either way.
    let mosques = match state.engine.search(&request).await {
        Ok(mosques) => mosques,
        Err(e) => {
            registry.increment("search.failures");
            error!(
                error = %e,
                latitude = request.center.latitude,
                longitude = request.center.longitude,
                radius_km = request.radius_km,
                "Nearby search failed"
            );
            Vec::new()
        }
    };

    timer.stop();
    registry.increment_by("search.results", mosques.len() as u64);

    Json(NearbyMosquesResponse { mosques }).into_response()
}
