//! HTTP API for the availability store
//!
//! - `GET /tables` lists every table
//! - `GET /tables/:table_id` returns one table or 404
//! - `PUT /tables/:table_id` with `{ "available": bool }` sets the flag

use crate::availability::store::TableStore;
use crate::common::request_tracing_middleware;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for availability handlers
#[derive(Clone)]
pub struct AvailabilityState {
    pub store: Arc<TableStore>,
}

fn table_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Table not found" })),
    )
        .into_response()
}

async fn list_tables(State(state): State<AvailabilityState>) -> impl IntoResponse {
    Json(state.store.list())
}

async fn get_table(
    State(state): State<AvailabilityState>,
    Path(table_id): Path<String>,
) -> axum::response::Response {
    match state.store.get(&table_id) {
        Some(table) => Json(table).into_response(),
        None => table_not_found(),
    }
}

/// The body is taken as raw JSON so a non-boolean `available` gets the store's own 400
/// rather than a generic extractor rejection.
async fn put_table(
    State(state): State<AvailabilityState>,
    Path(table_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    if state.store.get(&table_id).is_none() {
        return table_not_found();
    }

    let Some(available) = body.get("available").and_then(|v| v.as_bool()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid 'available' value. It must be a boolean." })),
        )
            .into_response();
    };

    match state.store.set_available(&table_id, available) {
        Some(table) => {
            tracing::info!(table_id = %table.table_id, available, "Availability updated");
            Json(table).into_response()
        }
        None => table_not_found(),
    }
}

async fn health(State(state): State<AvailabilityState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "tables": state.store.list().len(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates the HTTP router for the availability store.
pub fn create_router(state: AvailabilityState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tables", get(list_tables))
        .route("/tables/:table_id", get(get_table).put(put_table))
        .layer(axum::middleware::from_fn(request_tracing_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
