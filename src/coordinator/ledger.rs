//! Reservation and waitlist storage for the coordinator
//!
//! `ReservationLedger` is the seam between the reservation engine and wherever its records live.
//! Each method is one atomic step: a concurrent reader sees either none or all of its effects.
//! `MemLedger` keeps everything in process memory.

use crate::coordinator::model::{
    Divergence, Reservation, ReservationId, ReservationStatus, WaitlistEntry,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of removing a confirmed reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub cancelled: Reservation,
    /// Head of the table's waitlist, now holding the seat
    pub promoted: Option<Reservation>,
}

/// Storage backend for reservations, waitlists and divergence records
pub trait ReservationLedger: Send + Sync {
    /// Allocate a fresh id and record a confirmed reservation
    fn confirm(&self, table_id: &str, customer_id: &str) -> Reservation;

    /// Append to the tail of a table's waitlist; returns the 1-based position
    fn enqueue(&self, table_id: &str, entry: WaitlistEntry) -> usize;

    /// Remove the customer's reservation on the table and, when the table has a waitlist,
    /// hand the seat to its head in the same step.
    fn cancel(&self, table_id: &str, customer_id: &str) -> Option<Cancellation>;

    /// Remove the customer's first waitlist entry for the table
    fn withdraw(&self, table_id: &str, customer_id: &str) -> bool;

    /// Pop the head of a table's waitlist into a confirmed reservation
    fn promote_next(&self, table_id: &str) -> Option<Reservation>;

    fn active_reservation(&self, table_id: &str) -> Option<Reservation>;

    /// Active reservations in creation order
    fn reservations(&self) -> Vec<Reservation>;

    /// A table's queue, head first
    fn waitlist(&self, table_id: &str) -> Vec<WaitlistEntry>;

    /// Record a cancellation whose remote release failed. One record per table.
    fn flag_divergence(&self, divergence: Divergence);

    fn divergence(&self, table_id: &str) -> Option<Divergence>;

    fn divergences(&self) -> Vec<Divergence>;

    fn clear_divergence(&self, table_id: &str) -> Option<Divergence>;
}

#[derive(Default)]
struct LedgerState {
    reservations: Vec<Reservation>,
    waitlists: HashMap<String, VecDeque<WaitlistEntry>>,
    divergences: BTreeMap<String, Divergence>,
    last_id: u64,
}

impl LedgerState {
    fn next_id(&mut self) -> ReservationId {
        self.last_id += 1;
        format!("R{}", self.last_id)
    }

    fn confirm(&mut self, table_id: &str, customer_id: &str) -> Reservation {
        let reservation = Reservation {
            reservation_id: self.next_id(),
            table_id: table_id.to_string(),
            customer_id: customer_id.to_string(),
            status: ReservationStatus::Confirmed,
        };
        self.reservations.push(reservation.clone());
        reservation
    }

    fn promote_next(&mut self, table_id: &str) -> Option<Reservation> {
        let next = self.waitlists.get_mut(table_id)?.pop_front()?;
        Some(self.confirm(table_id, &next.customer_id))
    }
}

/// In-memory ledger (default)
pub struct MemLedger {
    state: Mutex<LedgerState>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationLedger for MemLedger {
    fn confirm(&self, table_id: &str, customer_id: &str) -> Reservation {
        self.state().confirm(table_id, customer_id)
    }

    fn enqueue(&self, table_id: &str, entry: WaitlistEntry) -> usize {
        let mut state = self.state();
        let queue = state.waitlists.entry(table_id.to_string()).or_default();
        queue.push_back(entry);
        queue.len()
    }

    fn cancel(&self, table_id: &str, customer_id: &str) -> Option<Cancellation> {
        let mut state = self.state();
        let index = state
            .reservations
            .iter()
            .position(|r| r.table_id == table_id && r.customer_id == customer_id)?;
        let cancelled = state.reservations.remove(index);
        let promoted = state.promote_next(table_id);
        Some(Cancellation {
            cancelled,
            promoted,
        })
    }

    fn withdraw(&self, table_id: &str, customer_id: &str) -> bool {
        let mut state = self.state();
        let Some(queue) = state.waitlists.get_mut(table_id) else {
            return false;
        };
        match queue.iter().position(|e| e.customer_id == customer_id) {
            Some(index) => {
                queue.remove(index);
                true
            }
            None => false,
        }
    }

    fn promote_next(&self, table_id: &str) -> Option<Reservation> {
        self.state().promote_next(table_id)
    }

    fn active_reservation(&self, table_id: &str) -> Option<Reservation> {
        self.state()
            .reservations
            .iter()
            .find(|r| r.table_id == table_id)
            .cloned()
    }

    fn reservations(&self) -> Vec<Reservation> {
        self.state().reservations.clone()
    }

    fn waitlist(&self, table_id: &str) -> Vec<WaitlistEntry> {
        self.state()
            .waitlists
            .get(table_id)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn flag_divergence(&self, divergence: Divergence) {
        self.state()
            .divergences
            .insert(divergence.table_id.clone(), divergence);
    }

    fn divergence(&self, table_id: &str) -> Option<Divergence> {
        self.state().divergences.get(table_id).cloned()
    }

    fn divergences(&self) -> Vec<Divergence> {
        self.state().divergences.values().cloned().collect()
    }

    fn clear_divergence(&self, table_id: &str) -> Option<Divergence> {
        self.state().divergences.remove(table_id)
    }
}
