//! Coordinator HTTP API, in-process and against a live availability store

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::Harness;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tableside::availability::http::{create_router as availability_router, AvailabilityState};
use tableside::availability::TableStore;
use tableside::coordinator::http::{create_router, CoordState};
use tableside::coordinator::seed::Seed;
use tableside::coordinator::{
    AvailabilityClient, HttpAvailabilityClient, MemLedger, ReservationEngine, ReservationLedger,
};
use tableside::common::REQUEST_ID_HEADER;
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;

fn router(h: &Harness) -> Router {
    create_router(
        CoordState {
            engine: h.engine.clone(),
        },
        BODY_LIMIT,
    )
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn reserve(router: &Router, table: &str, customer: &str, kind: &str) -> (StatusCode, Value) {
    send(
        router,
        Method::POST,
        "/reservations",
        Some(json!({ "tableId": table, "customerId": customer, "reservationType": kind })),
    )
    .await
}

#[tokio::test]
async fn test_confirmed_response_shape() {
    let h = Harness::house();
    let app = router(&h);

    let (status, body) = reserve(&app, "T001", "C104", "reserve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "reservationId": "R1", "status": "success", "tableId": "T001" })
    );
}

#[tokio::test]
async fn test_waitlisted_response_shape() {
    let h = Harness::house();
    let app = router(&h);

    let (status, body) = send(
        &app,
        Method::POST,
        "/reservations",
        Some(json!({
            "tableId": "T002",
            "customerId": "C104",
            "reservationType": "reserve",
            "preferences": ["Window"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "waitlisted");
    assert_eq!(body["reservationId"], Value::Null);
    assert_eq!(body["waitlistMessage"], "You are #4 in the queue.");

    let (status, body) = send(&app, Method::GET, "/waitlists/T002", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 4);
    assert_eq!(body["entries"][3]["customerId"], "C104");
    assert_eq!(body["entries"][3]["preferences"], json!(["Window"]));
}

#[tokio::test]
async fn test_cancel_with_promotion_over_http() {
    let h = Harness::unseeded();
    let app = router(&h);

    reserve(&app, "T003", "A", "reserve").await;
    reserve(&app, "T003", "B", "reserve").await;

    let (status, body) = reserve(&app, "T003", "A", "cancel").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["reservationId"], "R1");
    assert!(body["message"].as_str().unwrap().contains("Customer B"));

    let (_, body) = send(&app, Method::GET, "/reservations", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["reservations"][0]["customerId"], "B");
    assert_eq!(body["reservations"][0]["reservationId"], "R2");
}

#[tokio::test]
async fn test_invalid_type_is_400() {
    let h = Harness::house();
    let app = router(&h);

    let (status, body) = reserve(&app, "T001", "C104", "book").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(h.available("T001"));
}

#[tokio::test]
async fn test_missing_fields_are_400() {
    let h = Harness::house();
    let app = router(&h);

    let (status, body) = send(
        &app,
        Method::POST,
        "/reservations",
        Some(json!({ "reservationType": "reserve" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_wrongly_typed_fields_are_400() {
    let h = Harness::house();
    let app = router(&h);

    for body in [
        json!({ "tableId": "T001", "customerId": "C1", "reservationType": 5 }),
        json!({ "tableId": "T001", "customerId": "C1", "reservationType": "reserve", "preferences": "Window" }),
    ] {
        let (status, body) = send(&app, Method::POST, "/reservations", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }
    assert!(h.available("T001"));
    assert!(h.engine.reservations().is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_400() {
    let h = Harness::house();
    let app = router(&h);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/reservations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("reserve T001 please"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_not_found_cases_are_404() {
    let h = Harness::house();
    let app = router(&h);

    let (status, body) = reserve(&app, "T001", "C999", "cancel").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Reservation not found for cancellation");
    assert_eq!(body["code"], "not_found");

    let (status, body) = reserve(&app, "T404", "C999", "reserve").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_upstream_failure_is_503() {
    let h = Harness::house();
    h.availability.fail_gets(true);
    let app = router(&h);

    let (status, body) = reserve(&app, "T001", "C104", "reserve").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "upstream_unavailable");
}

#[tokio::test]
async fn test_divergence_and_reconcile_endpoints() {
    let h = Harness::unseeded();
    let app = router(&h);

    reserve(&app, "T001", "C1", "reserve").await;
    h.availability.fail_sets(true);
    let (status, body) = reserve(&app, "T001", "C1", "cancel").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "reconciliation_required");
    assert_eq!(body["tableId"], "T001");
    assert_eq!(body["reservationId"], "R1");
    h.availability.fail_sets(false);

    let (_, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["pendingDivergences"], 1);

    let (_, body) = send(&app, Method::GET, "/admin/divergences", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["divergences"][0]["tableId"], "T001");

    let (status, body) = send(&app, Method::POST, "/admin/reconcile/T001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "released");
    assert_eq!(body["tableId"], "T001");

    let (_, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_and_request_id() {
    let h = Harness::house();
    let app = router(&h);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("tableside_outcomes_total"));
}

#[tokio::test]
async fn test_end_to_end_over_the_wire() {
    let store = Arc::new(TableStore::seeded());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let upstream = availability_router(AvailabilityState {
        store: store.clone(),
    });
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    let client = HttpAvailabilityClient::new(format!("http://{}", addr), Duration::from_secs(2))
        .unwrap();
    let ledger = Arc::new(MemLedger::new());
    Seed::house().apply(ledger.as_ref());
    let engine = ReservationEngine::new(
        Arc::new(client) as Arc<dyn AvailabilityClient>,
        ledger as Arc<dyn ReservationLedger>,
        Duration::from_secs(2),
    );
    let app = create_router(
        CoordState {
            engine: Arc::new(engine),
        },
        BODY_LIMIT,
    );

    let (status, body) = reserve(&app, "T003", "C200", "reserve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(!store.get("T003").unwrap().available);

    let (status, body) = reserve(&app, "T004", "C201", "reserve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["waitlistMessage"], "You are #1 in the queue.");

    let (status, _) = reserve(&app, "T003", "C200", "cancel").await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.get("T003").unwrap().available);

    let (status, body) = reserve(&app, "T404", "C200", "reserve").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
