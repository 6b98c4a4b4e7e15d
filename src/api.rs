//! HTTP API handlers and router for Flare.
//!
//! # Endpoints
//!
//! - `POST /api/incident/report` - Report a new incident
//! - `GET /api/incident/:incident_id` - Fetch a single incident
//! - `PATCH /api/incident/:incident_id` - Update an incident's status
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus exposition
//!
//! The three incident routes require a bearer token; `/health` and
//! `/metrics` stay open. Handlers translate between the API shapes and the
//! stored record via [`crate::mapper`] and return [`Error`] for the boundary
//! to map onto status codes.

use std::sync::Arc;

use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::auth::{Authenticator, Caller, require_bearer};
use crate::error::Error;
use crate::mapper;
use crate::metrics::{Metrics, track_http};
use crate::model::{IncidentDetail, ReportIncidentRequest, UpdateStatusRequest};
use crate::storage::Storage;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub auth: Arc<dyn Authenticator>,
    pub metrics: Metrics,
}

/// Assemble the full application router.
///
/// Used by both the binary and the integration tests so the route table and
/// middleware stack exist in exactly one place.
pub fn router(state: AppState) -> Router {
    let incident_routes = Router::new()
        .route("/api/incident/report", post(report_incident))
        .route(
            "/api/incident/:incident_id",
            get(get_incident_detail).patch(update_incident_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_bearer,
        ));

    Router::new()
        .merge(incident_routes)
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_exposition))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_http,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /api/incident/report - Report a new incident.
///
/// Maps the request to a fresh record (new id, quantized coordinates,
/// status `Reported`), persists it, and returns the created incident.
///
/// # Response
///
/// `200 OK` with the incident detail, or `422` when validation fails.
#[instrument(skip(state, request))]
pub async fn report_incident(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<ReportIncidentRequest>,
) -> Result<Json<IncidentDetail>, Error> {
    let record = mapper::to_record(&request)?;
    state.storage.create_incident(&record).await?;
    state.metrics.incident_created();

    info!(
        incident_id = %record.incident_id,
        incident_type = %record.incident_type,
        severity = %record.severity,
        reporter = %record.user_id,
        caller = %caller.user_id,
        "Incident reported"
    );

    Ok(Json(mapper::to_detail(&record)?))
}

/// GET /api/incident/:incident_id - Fetch details of a single incident.
///
/// # Response
///
/// `200 OK` with the incident detail, or `404` when the id is unknown.
#[instrument(skip(state))]
pub async fn get_incident_detail(
    State(state): State<AppState>,
    Path(incident_id): Path<String>,
) -> Result<Json<IncidentDetail>, Error> {
    let record = state
        .storage
        .get_incident(&incident_id)
        .await?
        .ok_or_else(|| Error::NotFound(incident_id.clone()))?;

    Ok(Json(mapper::to_detail(&record)?))
}

/// PATCH /api/incident/:incident_id - Update an incident's status.
///
/// Confirms the incident exists for a fast 404, then issues the atomic
/// status update and returns the post-update record. The mutation itself
/// does not rely on the pre-check; last write wins between concurrent
/// updates on the same id.
///
/// # Response
///
/// `200 OK` with the updated incident detail, or `404` when the id is
/// unknown.
#[instrument(skip(state))]
pub async fn update_incident_status(
    State(state): State<AppState>,
    Path(incident_id): Path<String>,
    Json(update): Json<UpdateStatusRequest>,
) -> Result<Json<IncidentDetail>, Error> {
    if state.storage.get_incident(&incident_id).await?.is_none() {
        return Err(Error::NotFound(incident_id));
    }

    let record = state
        .storage
        .update_status(&incident_id, update.status.as_str())
        .await?;

    info!(
        incident_id = %record.incident_id,
        status = %record.status,
        "Incident status updated"
    );

    Ok(Json(mapper::to_detail(&record)?))
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_exposition(State(state): State<AppState>) -> Response {
    match state.metrics.encode_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
