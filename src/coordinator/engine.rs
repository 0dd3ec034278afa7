//! Reservation engine
//!
//! Every request runs as one critical section on its table:
//!
//! ```text
//!   validate ──► lock(table) ──► GetTable ──┬─ reserve, free  ──► SetAvailability(false) ──► confirm
//!                                           ├─ reserve, taken ──► enqueue
//!                                           └─ cancel ──► ledger.cancel ──┬─ promoted ──► done (flag stays false)
//!                                                                         ├─ vacated  ──► SetAvailability(true)
//!                                                                         └─ none     ──► withdraw from waitlist
//! ```
//!
//! Validation happens before the lock and before any remote call. The critical section runs on
//! its own task, so a caller that goes away mid-request (client disconnect, timeout) cannot
//! strand it between the remote write and the ledger update. A failed confirm write leaves
//! no local trace. A failed release write after a local cancellation is recorded as a
//! [`Divergence`] and reported as [`Error::ReleaseDiverged`]; [`ReservationEngine::reconcile`]
//! settles it later.

use crate::common::{validate_id, Error, ErrorKind, Result, Table, UpstreamOp, METRICS};
use crate::coordinator::availability_client::AvailabilityClient;
use crate::coordinator::ledger::{Cancellation, ReservationLedger};
use crate::coordinator::locks::TableLocks;
use crate::coordinator::model::{
    Divergence, ReconcileAction, Reservation, ReservationKind, ReservationOutcome,
    ReservationRequest, WaitlistEntry,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Cheap to clone: every clone shares the same store client, ledger and table locks.
#[derive(Clone)]
pub struct ReservationEngine {
    availability: Arc<dyn AvailabilityClient>,
    ledger: Arc<dyn ReservationLedger>,
    locks: TableLocks,
    upstream_timeout: Duration,
}

impl ReservationEngine {
    pub fn new(
        availability: Arc<dyn AvailabilityClient>,
        ledger: Arc<dyn ReservationLedger>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            availability,
            ledger,
            locks: TableLocks::new(),
            upstream_timeout,
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    /// Handle one reserve or cancel request.
    ///
    /// The request runs to completion even if the returned future is dropped.
    pub async fn process(&self, request: ReservationRequest) -> Result<ReservationOutcome> {
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            let result = engine.dispatch(request).await;
            match &result {
                Ok(outcome) => record_outcome(outcome),
                Err(e) => METRICS.record_error(e.kind()),
            }
            result
        });
        join(handle).await
    }

    async fn dispatch(&self, request: ReservationRequest) -> Result<ReservationOutcome> {
        let kind = request.validate()?;
        let ReservationRequest {
            table_id,
            customer_id,
            preferences,
            ..
        } = request;

        let _guard = self.locks.acquire(&table_id).await;
        debug!(table_id = %table_id, customer_id = %customer_id, %kind, "Processing request");

        let table = self
            .upstream(UpstreamOp::GetTable, &table_id, async {
                self.availability.get_table(&table_id).await
            })
            .await?;

        match kind {
            ReservationKind::Reserve => {
                self.reserve(&table, &customer_id, preferences.unwrap_or_default())
                    .await
            }
            ReservationKind::Cancel => self.cancel(&table_id, &customer_id).await,
        }
    }

    async fn reserve(
        &self,
        table: &Table,
        customer_id: &str,
        preferences: Vec<String>,
    ) -> Result<ReservationOutcome> {
        let table_id = table.table_id.as_str();

        if !table.available {
            let position = self
                .ledger
                .enqueue(table_id, WaitlistEntry::new(customer_id, preferences));
            info!(table_id, customer_id, position, "Customer waitlisted");
            return Ok(ReservationOutcome::Waitlisted {
                table_id: table_id.to_string(),
                position,
            });
        }

        if let Some(existing) = self.ledger.active_reservation(table_id) {
            warn!(
                table_id,
                reservation_id = %existing.reservation_id,
                "Availability store reports table free while a reservation is active"
            );
        }

        self.upstream(UpstreamOp::SetAvailability, table_id, async {
            self.availability
                .set_table_availability(table_id, false)
                .await
        })
        .await?;

        let reservation = self.ledger.confirm(table_id, customer_id);
        info!(
            table_id,
            customer_id,
            reservation_id = %reservation.reservation_id,
            "Reservation confirmed"
        );
        Ok(ReservationOutcome::Confirmed {
            reservation_id: reservation.reservation_id,
            table_id: table_id.to_string(),
        })
    }

    async fn cancel(&self, table_id: &str, customer_id: &str) -> Result<ReservationOutcome> {
        let Some(Cancellation {
            cancelled,
            promoted,
        }) = self.ledger.cancel(table_id, customer_id)
        else {
            if self.ledger.withdraw(table_id, customer_id) {
                info!(table_id, customer_id, "Removed from waitlist");
                return Ok(ReservationOutcome::RemovedFromWaitlist {
                    table_id: table_id.to_string(),
                });
            }
            return Err(Error::ReservationNotFound {
                table_id: table_id.to_string(),
                customer_id: customer_id.to_string(),
            });
        };

        // Seat passes straight to the head of the queue; the remote flag stays false.
        if let Some(promoted) = promoted {
            info!(
                table_id,
                cancelled = %cancelled.reservation_id,
                promoted_customer = %promoted.customer_id,
                new_reservation = %promoted.reservation_id,
                "Reservation cancelled, waitlist head promoted"
            );
            return Ok(ReservationOutcome::CancelledWithPromotion {
                reservation_id: cancelled.reservation_id,
                table_id: table_id.to_string(),
                promoted_customer_id: promoted.customer_id,
                new_reservation_id: promoted.reservation_id,
            });
        }

        let released = self
            .upstream(UpstreamOp::SetAvailability, table_id, async {
                self.availability.set_table_availability(table_id, true).await
            })
            .await;

        match released {
            Ok(_) => {
                info!(
                    table_id,
                    reservation_id = %cancelled.reservation_id,
                    "Reservation cancelled, table released"
                );
                Ok(ReservationOutcome::Cancelled {
                    reservation_id: cancelled.reservation_id,
                    table_id: table_id.to_string(),
                })
            }
            Err(e) => {
                let cause = e.to_string();
                self.ledger.flag_divergence(Divergence {
                    table_id: table_id.to_string(),
                    reservation_id: cancelled.reservation_id.clone(),
                    customer_id: cancelled.customer_id.clone(),
                    cause: cause.clone(),
                    flagged_at: chrono::Utc::now(),
                });
                self.refresh_divergence_gauge();
                error!(
                    table_id,
                    reservation_id = %cancelled.reservation_id,
                    cause = %cause,
                    "Cancellation applied but table release failed; flagged for reconciliation"
                );
                Err(Error::ReleaseDiverged {
                    table_id: table_id.to_string(),
                    reservation_id: cancelled.reservation_id,
                    cause,
                })
            }
        }
    }

    /// Settle a table flagged by a failed release.
    ///
    /// Reads the table, then restores `available == false` iff the table has an active
    /// reservation: an occupied table is re-marked unavailable, a vacant one with a queue
    /// promotes its head, a vacant one without a queue is released. Uses at most one read
    /// and one write; the flag is cleared only when those succeed.
    pub async fn reconcile(&self, table_id: &str) -> Result<ReconcileAction> {
        validate_id("tableId", table_id)?;
        let engine = self.clone();
        let table_id = table_id.to_string();
        join(tokio::spawn(async move { engine.settle(&table_id).await })).await
    }

    async fn settle(&self, table_id: &str) -> Result<ReconcileAction> {
        let _guard = self.locks.acquire(table_id).await;

        let Some(divergence) = self.ledger.divergence(table_id) else {
            return Ok(ReconcileAction::NothingPending);
        };

        let table = self
            .upstream(UpstreamOp::GetTable, table_id, async {
                self.availability.get_table(table_id).await
            })
            .await?;

        let action = if let Some(reservation) = self.ledger.active_reservation(table_id) {
            self.mark(&table, false).await?;
            ReconcileAction::Occupied { reservation }
        } else if !self.ledger.waitlist(table_id).is_empty() {
            self.mark(&table, false).await?;
            match self.ledger.promote_next(table_id) {
                Some(reservation) => ReconcileAction::Promoted { reservation },
                None => {
                    return Err(Error::Internal(format!(
                        "waitlist for {} emptied while its table was locked",
                        table_id
                    )))
                }
            }
        } else {
            self.mark(&table, true).await?;
            ReconcileAction::Released
        };

        self.ledger.clear_divergence(table_id);
        self.refresh_divergence_gauge();
        info!(
            table_id,
            reservation_id = %divergence.reservation_id,
            ?action,
            "Divergence reconciled"
        );
        Ok(action)
    }

    /// Write the flag only when the store disagrees
    async fn mark(&self, table: &Table, available: bool) -> Result<()> {
        if table.available == available {
            return Ok(());
        }
        let table_id = table.table_id.as_str();
        self.upstream(UpstreamOp::SetAvailability, table_id, async {
            self.availability
                .set_table_availability(table_id, available)
                .await
        })
        .await
        .map(|_| ())
    }

    /// Bound an availability store call by the configured timeout and record its latency.
    async fn upstream<T, F>(&self, op: UpstreamOp, table_id: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::UpstreamTimeout(self.upstream_timeout)),
        };
        METRICS.record_upstream(op, start.elapsed());

        if let Err(e) = &result {
            if e.kind() == ErrorKind::UpstreamUnavailable {
                warn!(table_id, op = op.as_str(), error = %e, "Availability store call failed");
            }
        }
        result
    }

    fn refresh_divergence_gauge(&self) {
        METRICS
            .pending_divergences
            .set(self.ledger.divergences().len() as u64);
    }

    pub fn reservations(&self) -> Vec<Reservation> {
        self.ledger.reservations()
    }

    pub fn waitlist(&self, table_id: &str) -> Vec<WaitlistEntry> {
        self.ledger.waitlist(table_id)
    }

    pub fn divergences(&self) -> Vec<Divergence> {
        self.ledger.divergences()
    }
}

async fn join<T>(handle: tokio::task::JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| Error::Internal(format!("reservation task failed: {}", e)))?
}

fn record_outcome(outcome: &ReservationOutcome) {
    match outcome {
        ReservationOutcome::Confirmed { .. } => METRICS.confirmed.inc(),
        ReservationOutcome::Waitlisted { .. } => METRICS.waitlisted.inc(),
        ReservationOutcome::Cancelled { .. } => METRICS.cancelled.inc(),
        ReservationOutcome::CancelledWithPromotion { .. } => {
            METRICS.cancelled.inc();
            METRICS.promoted.inc();
        }
        ReservationOutcome::RemovedFromWaitlist { .. } => METRICS.waitlist_removals.inc(),
    }
}
