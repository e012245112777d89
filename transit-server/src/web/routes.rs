//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::catalog::{SearchQuery, SearchQueryError, search_buses, search_trains, search_trains_near};
use crate::contact::{ContactError, ContactRequest};
use crate::fares::{ExpresswayFare, FareQuote, QuoteError, estimate_stage_from_distance, quote};
use crate::geo::{Coordinates, DEFAULT_NEAREST_LIMIT, InvalidCoordinates, LocationPoint, nearest};

use super::dto::*;
use super::extract::{Path, Query};
use super::middleware::rate_limit;
use super::state::AppState;

/// Upper bound on nearest-point results.
const MAX_NEAREST_LIMIT: usize = 50;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/nearest", get(nearest_stops))
        .route("/api/stations/nearest", get(nearest_stations))
        .route("/api/fares/stage/:stage", get(stage_fare))
        .route("/api/fares/estimate", get(estimate_fare))
        .route("/api/fares/expressway", get(expressway_routes))
        .route("/api/fares/expressway/:route", get(expressway_fare))
        .route("/api/fares/quote", get(fare_quote))
        .route("/api/buses/search", get(bus_search))
        .route("/api/trains/search", get(train_search))
        .route("/api/contact", post(contact))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound {
        message: "Not Found".to_string(),
    }
}

/// Bus stops closest to a position.
async fn nearest_stops(
    State(state): State<AppState>,
    Query(req): Query<NearestRequest>,
) -> Result<Json<NearestResponse>, AppError> {
    nearest_places(&state.datasets.bus_stops, &req).map(Json)
}

/// Railway stations closest to a position.
async fn nearest_stations(
    State(state): State<AppState>,
    Query(req): Query<NearestRequest>,
) -> Result<Json<NearestResponse>, AppError> {
    nearest_places(&state.datasets.train_stations, &req).map(Json)
}

fn nearest_places(points: &[LocationPoint], req: &NearestRequest) -> Result<NearestResponse, AppError> {
    let origin = Coordinates::new(req.lat, req.lng)?;
    let limit = req
        .limit
        .unwrap_or(DEFAULT_NEAREST_LIMIT)
        .min(MAX_NEAREST_LIMIT);

    let results = nearest(origin, points, limit)
        .iter()
        .map(NearbyPlace::from_nearby)
        .collect();

    Ok(NearestResponse { results })
}

/// Fares for one stage.
async fn stage_fare(
    State(state): State<AppState>,
    Path(stage): Path<u32>,
) -> Result<Json<StageFareResponse>, AppError> {
    let table = state.fares.current().await;
    let fares = table.fare_for_stage(stage).ok_or_else(|| AppError::NotFound {
        message: format!("No fare published for stage {stage}"),
    })?;

    Ok(Json(StageFareResponse {
        fares,
        last_updated: table.last_updated(),
        source: table.source().to_string(),
    }))
}

/// Estimate the stage and fares for a road distance.
async fn estimate_fare(
    State(state): State<AppState>,
    Query(req): Query<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    if !req.km.is_finite() || req.km < 0.0 {
        return Err(AppError::BadRequest {
            message: format!("Invalid distance: {}", req.km),
        });
    }

    let stage = estimate_stage_from_distance(req.km);
    let fares = state.fares.current().await.fare_for_stage(stage);

    Ok(Json(EstimateResponse {
        km: req.km,
        stage,
        fares,
    }))
}

/// All expressway flat fares.
async fn expressway_routes(State(state): State<AppState>) -> Json<ExpresswayRoutesResponse> {
    let table = state.fares.current().await;
    let routes = table
        .expressway_routes()
        .into_iter()
        .filter_map(|route| {
            table.expressway_fare(route).map(|fare| ExpresswayFare {
                route: route.to_string(),
                fare,
            })
        })
        .collect();

    Json(ExpresswayRoutesResponse { routes })
}

/// Flat fare for one expressway route.
async fn expressway_fare(
    State(state): State<AppState>,
    Path(route): Path<String>,
) -> Result<Json<ExpresswayFare>, AppError> {
    let fare = state
        .fares
        .current()
        .await
        .expressway_fare(&route)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No expressway fare for {route}"),
        })?;

    Ok(Json(ExpresswayFare { route, fare }))
}

/// Quote fares between two named bus stops.
async fn fare_quote(
    State(state): State<AppState>,
    Query(req): Query<QuoteRequest>,
) -> Result<Json<FareQuote>, AppError> {
    let table = state.fares.current().await;
    let fare_quote = quote(&table, &state.datasets.bus_stops, &req.origin, &req.terminal)?;
    Ok(Json(fare_quote))
}

/// Buses from an origin to a destination.
async fn bus_search(
    State(state): State<AppState>,
    Query(req): Query<BusSearchRequest>,
) -> Result<Json<BusSearchResponse>, AppError> {
    let query = SearchQuery::new(&req.origin, &req.destination)?;
    let routes = search_buses(&state.datasets.bus_routes, &query)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(BusSearchResponse { routes }))
}

/// Trains from a named origin, or from the station nearest a position.
async fn train_search(
    State(state): State<AppState>,
    Query(req): Query<TrainSearchRequest>,
) -> Result<Json<TrainSearchResponse>, AppError> {
    let datasets = &state.datasets;

    if let (Some(lat), Some(lng)) = (req.lat, req.lng) {
        let position = Coordinates::new(lat, lng)?;
        let found = search_trains_near(
            &datasets.train_stations,
            &datasets.train_routes,
            position,
            &req.destination,
        )?
        .ok_or_else(|| AppError::NotFound {
            message: "No train stations available".to_string(),
        })?;

        return Ok(Json(TrainSearchResponse {
            origin_station: Some(NearbyPlace::from_nearby(&found.station)),
            routes: found.routes.into_iter().cloned().collect(),
        }));
    }

    let origin = req.origin.as_deref().ok_or_else(|| AppError::BadRequest {
        message: "Either origin or lat and lng are required".to_string(),
    })?;
    let query = SearchQuery::new(origin, &req.destination)?;
    let routes = search_trains(&datasets.train_routes, &query)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(TrainSearchResponse {
        origin_station: None,
        routes,
    }))
}

/// Accept a contact form submission.
async fn contact(State(state): State<AppState>, body: Bytes) -> Result<Json<ContactResponse>, AppError> {
    // Parse JSON manually so we can log the failure
    let req: ContactRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, bytes = body.len(), "invalid contact JSON");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let req = req.normalize()?;
    state.mailer.send(&req)?;

    Ok(Json(ContactResponse {
        success: true,
        message: "Message sent successfully!".to_string(),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Validation { message: String, issues: Vec<ValidationIssue> },
    Internal { message: String },
}

impl AppError {
    fn validation(errors: &ValidationErrors) -> Self {
        let mut issues: Vec<ValidationIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationIssue {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid")),
                    code: e.code.to_string(),
                })
            })
            .collect();
        issues.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::Validation {
            message: "Validation Error".to_string(),
            issues,
        }
    }
}

impl From<InvalidCoordinates> for AppError {
    fn from(e: InvalidCoordinates) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<SearchQueryError> for AppError {
    fn from(e: SearchQueryError) -> Self {
        AppError::validation(&e.0)
    }
}

impl From<QuoteError> for AppError {
    fn from(e: QuoteError) -> Self {
        AppError::NotFound {
            message: e.to_string(),
        }
    }
}

impl From<ContactError> for AppError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::Invalid(errors) => AppError::validation(&errors),
            ContactError::NotConfigured => AppError::Internal {
                message: "Configuration Error".to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, details) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, Vec::new()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, Vec::new()),
            AppError::Validation { message, issues } => (StatusCode::BAD_REQUEST, message, issues),
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new())
            }
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            details,
        });
        (status, body).into_response()
    }
}
