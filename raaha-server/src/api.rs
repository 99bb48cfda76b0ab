//! REST API and SSE routes

use crate::scheduler;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt as FuturesStreamExt};
use raaha_core::{
    fare::{estimate_fare, quote_all, FareBreakdown, FareQuote, VehicleClass},
    locale::{format_currency, format_distance, format_eta, Language, TextDirection},
    metrics::DriverStatus,
    DerivedMetrics, GeoPoint, Route, TrackerError,
};
use raaha_sim::{
    landmarks::{GeocodeResult, Landmark, DEFAULT_DESTINATION, DEFAULT_PICKUP},
    tracker::TrackerState,
    LiteralRouteSupplier, RouteSupplier, StraightLineSupplier, TrackerStatus, Visibility,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

type ApiError = (StatusCode, String);

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Tracking endpoints
        .route("/api/tracking/start", post(start_tracking))
        .route("/api/tracking/stop", post(stop_tracking))
        .route("/api/tracking/visibility", post(set_visibility))
        .route("/api/tracking/status", get(tracking_status))
        .route("/api/tracking/position", get(tracking_position))
        .route("/api/tracking/metrics", get(tracking_metrics))
        .route("/api/tracking/stream", get(tracking_stream))
        // Lookup endpoints
        .route("/api/geocode", get(geocode))
        .route("/api/landmarks", get(list_landmarks))
        .route("/api/suggest", get(suggest))
        .route("/api/fare", get(fare_estimate))
        .route("/api/fare/quote", get(fare_quotes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn bad_request(err: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

// === Tracking Endpoints ===

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: TrackerStatus,
    pub driver_status: DriverStatus,
    pub driver_status_label: &'static str,
    pub visibility: Visibility,
    pub tick_interval_ms: u64,
    pub waypoint_count: usize,
    pub state: TrackerState,
}

async fn status_snapshot(state: &AppState) -> StatusResponse {
    let tracker = state.tracker.read().await;
    let driver_status = tracker.driver_status();
    StatusResponse {
        status: tracker.status(),
        driver_status,
        driver_status_label: driver_status.label(),
        visibility: tracker.visibility(),
        tick_interval_ms: tracker.tick_interval().as_millis() as u64,
        waypoint_count: tracker.route().map(Route::len).unwrap_or(0),
        state: tracker.state(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StartRequest {
    /// Explicit route; takes precedence over `from`/`to`
    pub waypoints: Option<Vec<GeoPoint>>,
    /// Place names, geocoded against the landmark directory
    pub from: Option<String>,
    pub to: Option<String>,
    pub speed_kmh: Option<f64>,
}

fn build_route(state: &AppState, request: &StartRequest) -> Result<Route, ApiError> {
    if let Some(waypoints) = &request.waypoints {
        return Route::new(waypoints.clone()).map_err(bad_request);
    }

    match (&request.from, &request.to) {
        (Some(from), Some(to)) => {
            let from = state.landmarks.geocode(from).point;
            let to = state.landmarks.geocode(to).point;
            StraightLineSupplier::default()
                .route(from, to)
                .map_err(|e| bad_request(format!("{:#}", e)))
        }
        (None, None) => LiteralRouteSupplier::default()
            .route(DEFAULT_PICKUP, DEFAULT_DESTINATION)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))),
        _ => Err(bad_request("both 'from' and 'to' are required")),
    }
}

async fn start_tracking(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let route = build_route(&state, &request)?;

    scheduler::start_ride(&state, route, request.speed_kmh)
        .await
        .map_err(bad_request)?;

    Ok(Json(status_snapshot(&state).await))
}

async fn stop_tracking(State(state): State<AppState>) -> Json<StatusResponse> {
    scheduler::cancel_tick_task(&state).await;
    state.tracker.write().await.stop();
    Json(status_snapshot(&state).await)
}

#[derive(Deserialize)]
struct VisibilityRequest {
    visible: bool,
}

async fn set_visibility(
    State(state): State<AppState>,
    Json(request): Json<VisibilityRequest>,
) -> Json<StatusResponse> {
    let visibility = if request.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    state.tracker.write().await.set_visibility(visibility);
    state.cadence_changed.notify_waiters();
    Json(status_snapshot(&state).await)
}

async fn tracking_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(status_snapshot(&state).await)
}

#[derive(Serialize)]
struct PositionResponse {
    status: TrackerStatus,
    position: GeoPoint,
    bearing: f64,
}

async fn tracking_position(
    State(state): State<AppState>,
) -> Result<Json<PositionResponse>, ApiError> {
    let tracker = state.tracker.read().await;
    let position = tracker
        .current_position()
        .ok_or((StatusCode::NOT_FOUND, TrackerError::NotTracking.to_string()))?;

    Ok(Json(PositionResponse {
        status: tracker.status(),
        position,
        bearing: tracker.metrics().bearing.0,
    }))
}

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

fn parse_lang(lang: Option<&str>) -> Result<Language, ApiError> {
    lang.map(str::parse::<Language>)
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(bad_request)
}

#[derive(Serialize)]
struct MetricsDisplay {
    lang: Language,
    direction: TextDirection,
    eta: String,
    distance: String,
}

#[derive(Serialize)]
struct MetricsResponse {
    status: TrackerStatus,
    metrics: DerivedMetrics,
    display: MetricsDisplay,
}

async fn tracking_metrics(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let lang = parse_lang(query.lang.as_deref())?;
    let tracker = state.tracker.read().await;
    let metrics = tracker.metrics();

    Ok(Json(MetricsResponse {
        status: tracker.status(),
        metrics,
        display: MetricsDisplay {
            lang,
            direction: lang.direction(),
            eta: format_eta(metrics.eta, lang),
            distance: format_distance(metrics.remaining_distance, lang),
        },
    }))
}

// === Tracking Stream Endpoint ===

async fn tracking_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::error!("Failed to serialize tracking event: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Broadcast stream error: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// === Lookup Endpoints ===

#[derive(Deserialize)]
struct GeocodeQuery {
    q: String,
}

async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Json<GeocodeResult> {
    Json(state.landmarks.geocode(&query.q))
}

async fn list_landmarks(State(state): State<AppState>) -> Json<Vec<Landmark>> {
    Json(state.landmarks.landmarks().to_vec())
}

#[derive(Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
}

async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Json<Vec<String>> {
    Json(
        state
            .landmarks
            .suggest(&query.q)
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

#[derive(Deserialize)]
struct FareQuery {
    distance_km: f64,
    vehicle: Option<String>,
    lang: Option<String>,
}

#[derive(Serialize)]
struct FareResponse {
    #[serde(flatten)]
    breakdown: FareBreakdown,
    display_total: String,
}

fn validate_distance(distance_km: f64) -> Result<f64, ApiError> {
    if distance_km.is_finite() && distance_km >= 0.0 {
        Ok(distance_km)
    } else {
        Err(bad_request(format!(
            "distance_km must be a non-negative number, got {}",
            distance_km
        )))
    }
}

async fn fare_estimate(Query(query): Query<FareQuery>) -> Result<Json<FareResponse>, ApiError> {
    let distance_km = validate_distance(query.distance_km)?;
    let vehicle = query
        .vehicle
        .as_deref()
        .map(str::parse::<VehicleClass>)
        .transpose()
        .map_err(bad_request)?
        .unwrap_or(VehicleClass::Economy);
    let lang = parse_lang(query.lang.as_deref())?;

    let breakdown = estimate_fare(vehicle, distance_km);
    Ok(Json(FareResponse {
        display_total: format_currency(breakdown.total, lang),
        breakdown,
    }))
}

#[derive(Deserialize)]
struct QuoteQuery {
    distance_km: f64,
}

async fn fare_quotes(Query(query): Query<QuoteQuery>) -> Result<Json<Vec<FareQuote>>, ApiError> {
    let distance_km = validate_distance(query.distance_km)?;
    Ok(Json(quote_all(distance_km)))
}
