//! Cancellations whose table release fails, and their reconciliation

mod common;

use axum::http::StatusCode;
use common::Harness;
use tableside::common::{Error, ErrorKind};
use tableside::coordinator::{ReconcileAction, ReservationOutcome, ReservationRequest};

async fn reserved_then_diverged(h: &Harness, table_id: &str, customer_id: &str) -> Error {
    h.engine
        .process(ReservationRequest::reserve(table_id, customer_id))
        .await
        .unwrap();
    h.availability.fail_sets(true);
    let err = h
        .engine
        .process(ReservationRequest::cancel(table_id, customer_id))
        .await
        .unwrap_err();
    h.availability.fail_sets(false);
    err
}

#[tokio::test]
async fn test_failed_release_is_reported_and_recorded() {
    let h = Harness::unseeded();
    let err = reserved_then_diverged(&h, "T001", "C1").await;

    match &err {
        Error::ReleaseDiverged {
            table_id,
            reservation_id,
            ..
        } => {
            assert_eq!(table_id, "T001");
            assert_eq!(reservation_id, "R1");
        }
        other => panic!("expected ReleaseDiverged, got {:?}", other),
    }
    assert!(err.needs_reconciliation());
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(err.to_http_status(), StatusCode::BAD_GATEWAY);
    assert_eq!(err.code(), "reconciliation_required");

    // Local cancellation stands; the store still says taken
    assert!(h.engine.reservations().is_empty());
    assert!(!h.available("T001"));

    let divergences = h.engine.divergences();
    assert_eq!(divergences.len(), 1);
    assert_eq!(divergences[0].table_id, "T001");
    assert_eq!(divergences[0].customer_id, "C1");
}

#[tokio::test]
async fn test_reconcile_releases_vacant_table() {
    let h = Harness::unseeded();
    reserved_then_diverged(&h, "T001", "C1").await;

    let action = h.engine.reconcile("T001").await.unwrap();
    assert_eq!(action, ReconcileAction::Released);
    assert!(h.available("T001"));
    assert!(h.engine.divergences().is_empty());
    h.assert_consistent("T001");

    // Second pass has nothing to do
    assert_eq!(
        h.engine.reconcile("T001").await.unwrap(),
        ReconcileAction::NothingPending
    );
}

#[tokio::test]
async fn test_reconcile_promotes_customer_queued_meanwhile() {
    let h = Harness::unseeded();
    reserved_then_diverged(&h, "T003", "C1").await;

    // Store still reports taken, so newcomers queue
    let outcome = h
        .engine
        .process(ReservationRequest::reserve("T003", "C2"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReservationOutcome::Waitlisted {
            table_id: "T003".into(),
            position: 1
        }
    );

    match h.engine.reconcile("T003").await.unwrap() {
        ReconcileAction::Promoted { reservation } => {
            assert_eq!(reservation.customer_id, "C2");
            assert_eq!(reservation.reservation_id, "R2");
        }
        other => panic!("expected promotion, got {:?}", other),
    }
    assert!(!h.available("T003"));
    assert!(h.engine.waitlist("T003").is_empty());
    assert!(h.engine.divergences().is_empty());
    h.assert_consistent("T003");
}

#[tokio::test]
async fn test_failed_reconcile_keeps_the_flag() {
    let h = Harness::unseeded();
    reserved_then_diverged(&h, "T001", "C1").await;

    h.availability.fail_sets(true);
    let err = h.engine.reconcile("T001").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(h.engine.divergences().len(), 1);

    h.availability.fail_sets(false);
    assert_eq!(
        h.engine.reconcile("T001").await.unwrap(),
        ReconcileAction::Released
    );
}

#[tokio::test]
async fn test_reconcile_rejects_blank_table_id() {
    let h = Harness::unseeded();
    let err = h.engine.reconcile("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
