//! HTTP API for the reservation coordinator
//!
//! Public:
//! - `POST /reservations` reserve or cancel
//! - `GET /reservations` active reservations
//! - `GET /waitlists/:table_id` a table's queue, head first
//!
//! Operations:
//! - `GET /admin/divergences` cancellations whose table release failed
//! - `POST /admin/reconcile/:table_id` settle one flagged table
//! - `GET /health`, `GET /metrics`

use crate::common::{request_tracing_middleware, Error, ErrorKind, METRICS};
use crate::coordinator::engine::ReservationEngine;
use crate::coordinator::model::{ReservationRequest, ReservationResponse};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Shared coordinator state for HTTP handlers.
#[derive(Clone)]
pub struct CoordState {
    pub engine: Arc<ReservationEngine>,
}

/// Body problems (not JSON, wrong content type, wrong field types) are validation errors.
async fn process_reservation(
    State(state): State<CoordState>,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<Json<ReservationResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| {
        METRICS.record_error(ErrorKind::Validation);
        Error::Validation(rejection.body_text())
    })?;
    let outcome = state.engine.process(request).await?;
    Ok(Json(outcome.to_response()))
}

async fn list_reservations(State(state): State<CoordState>) -> impl IntoResponse {
    let reservations = state.engine.reservations();
    Json(json!({
        "reservations": reservations,
        "total": reservations.len(),
    }))
}

async fn get_waitlist(
    State(state): State<CoordState>,
    Path(table_id): Path<String>,
) -> impl IntoResponse {
    let entries = state.engine.waitlist(&table_id);
    Json(json!({
        "tableId": table_id,
        "entries": entries,
        "length": entries.len(),
    }))
}

async fn list_divergences(State(state): State<CoordState>) -> impl IntoResponse {
    let divergences = state.engine.divergences();
    Json(json!({
        "divergences": divergences,
        "total": divergences.len(),
    }))
}

async fn reconcile_table(
    State(state): State<CoordState>,
    Path(table_id): Path<String>,
) -> Result<Json<serde_json::Value>, Error> {
    let action = state.engine.reconcile(&table_id).await?;
    let mut body = serde_json::to_value(&action)
        .map_err(|e| Error::Internal(format!("Serialize error: {}", e)))?;
    body["tableId"] = json!(table_id);
    Ok(Json(body))
}

async fn health(State(state): State<CoordState>) -> impl IntoResponse {
    let pending = state.engine.divergences().len();
    Json(json!({
        "status": if pending == 0 { "healthy" } else { "degraded" },
        "pendingDivergences": pending,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.to_prometheus(),
    )
}

/// Creates the HTTP router with all coordinator endpoints.
pub fn create_router(state: CoordState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/reservations",
            post(process_reservation).get(list_reservations),
        )
        .route("/waitlists/:table_id", get(get_waitlist))
        .route("/admin/divergences", get(list_divergences))
        .route("/admin/reconcile/:table_id", post(reconcile_table))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_tracing_middleware))
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}
