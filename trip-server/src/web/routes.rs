//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use geojson::FeatureCollection;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::domain::TripQuery;
use crate::result::{
    GeometryOptions, ResultsByMode, RoutingResult, SegmentGeometry, StraightSegmentGeometry,
};
use crate::transit::{AccessibleNode, SummaryResponse};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/trip/route", post(route_trip))
        .route("/api/trip/path-geometry", post(path_geometry))
        .route("/api/transit/accessibility-map", post(accessibility_map))
        .route("/api/transit/summary", post(summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Route a trip with every requested mode.
async fn route_trip(
    State(state): State<AppState>,
    Json(query): Json<TripQuery>,
) -> Result<Json<Envelope<ResultsByMode>>, AppError> {
    if query.modes.is_empty() {
        return Err(AppError::BadRequest {
            message: "at least one mode is required".to_string(),
        });
    }

    // A client that disconnects drops this future, which stops routing.
    let envelope = match state.router.calculate(&query, None).await {
        Ok(results) => Envelope::Ok(results),
        Err(e) => Envelope::message(e.to_string()),
    };
    Ok(Json(envelope))
}

/// Draw one alternative of a single-mode result.
async fn path_geometry(
    State(state): State<AppState>,
    Json(req): Json<PathGeometryRequest>,
) -> Json<Envelope<FeatureCollection>> {
    let drawn = match &req.result {
        RoutingResult::Transit(result) => {
            let options = GeometryOptions::default()
                .with_complete_data(req.complete_data)
                .with_walking_color(state.walking_color.as_ref());
            let segments: &dyn SegmentGeometry = &StraightSegmentGeometry;
            result
                .path_geojson(req.index, &options, state.unimodal.as_ref(), Some(segments))
                .await
        }
        RoutingResult::Unimodal(result) => result.path_geojson(req.index, None),
    };

    match drawn {
        Ok(features) => {
            debug!(index = req.index, features = features.features.len(), "path drawn");
            Json(Envelope::Ok(features))
        }
        Err(e) => Json(Envelope::message(e.to_string())),
    }
}

/// Nodes reachable from (or to) a place by transit.
async fn accessibility_map(
    State(state): State<AppState>,
    Json(req): Json<AccessibilityMapRequest>,
) -> Json<Envelope<Vec<AccessibleNode>>> {
    let host_port = req.host_port();
    debug!(protocol = %state.transit.protocol(), "accessibility map request");
    match state
        .transit
        .accessible_map(&req.query, host_port.as_ref())
        .await
    {
        Ok(nodes) => Json(Envelope::Ok(nodes)),
        Err(e) => Json(Envelope::routing(&e)),
    }
}

/// Lines used by the transit alternatives of a trip.
async fn summary(
    State(state): State<AppState>,
    Json(query): Json<TripQuery>,
) -> Json<Envelope<SummaryResponse>> {
    match state.transit.summary(&query.to_transit_query()).await {
        Ok(summary) => Json(Envelope::Ok(summary)),
        Err(e) => Json(Envelope::routing(&e)),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, %message, "request rejected");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
