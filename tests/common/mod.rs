//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tableside::availability::TableStore;
use tableside::common::{Error, Result, Table};
use tableside::coordinator::{
    AvailabilityClient, MemLedger, ReservationEngine, ReservationLedger,
};
use tableside::coordinator::seed::Seed;
use tokio::sync::Barrier;

/// Availability store double that wraps a real `TableStore` and can fail, stall, or
/// rendezvous on demand.
pub struct FaultyAvailability {
    pub store: Arc<TableStore>,
    pub fail_gets: AtomicBool,
    pub fail_sets: AtomicBool,
    /// Added to every call, in milliseconds
    pub delay_ms: AtomicU64,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    /// When set, every `get_table` waits here before answering
    pub get_barrier: Option<Arc<Barrier>>,
}

impl FaultyAvailability {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self {
            store,
            fail_gets: AtomicBool::new(false),
            fail_sets: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            get_barrier: None,
        }
    }

    pub fn with_get_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.get_barrier = Some(barrier);
        self
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn stall(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl AvailabilityClient for FaultyAvailability {
    async fn get_table(&self, table_id: &str) -> Result<Table> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.get_barrier {
            barrier.wait().await;
        }
        self.stall().await;
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(Error::UpstreamUnavailable("injected read failure".into()));
        }
        self.store.get_table(table_id).await
    }

    async fn set_table_availability(&self, table_id: &str, available: bool) -> Result<Table> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(Error::UpstreamUnavailable("injected write failure".into()));
        }
        self.store.set_table_availability(table_id, available).await
    }
}

/// Engine, availability double and ledger wired together
pub struct Harness {
    pub engine: Arc<ReservationEngine>,
    pub availability: Arc<FaultyAvailability>,
    pub ledger: Arc<MemLedger>,
}

impl Harness {
    /// House tables and the house waitlist
    pub fn house() -> Self {
        Self::build(FaultyAvailability::new(Arc::new(TableStore::seeded())), Seed::house())
    }

    /// House tables, empty waitlists
    pub fn unseeded() -> Self {
        Self::build(FaultyAvailability::new(Arc::new(TableStore::seeded())), Seed::empty())
    }

    pub fn build(availability: FaultyAvailability, seed: Seed) -> Self {
        Self::with_timeout(availability, seed, Duration::from_secs(2))
    }

    pub fn with_timeout(availability: FaultyAvailability, seed: Seed, timeout: Duration) -> Self {
        let availability = Arc::new(availability);
        let ledger = Arc::new(MemLedger::new());
        seed.apply(ledger.as_ref());
        let engine = ReservationEngine::new(
            availability.clone() as Arc<dyn AvailabilityClient>,
            ledger.clone() as Arc<dyn ReservationLedger>,
            timeout,
        );
        Self {
            engine: Arc::new(engine),
            availability,
            ledger,
        }
    }

    pub fn available(&self, table_id: &str) -> bool {
        self.availability
            .store
            .get(table_id)
            .map(|t| t.available)
            .unwrap_or(false)
    }

    /// A table with no divergence is available exactly when it has no active reservation
    pub fn assert_consistent(&self, table_id: &str) {
        if self.ledger.divergence(table_id).is_some() {
            return;
        }
        let reserved = self.ledger.active_reservation(table_id).is_some();
        assert_eq!(
            self.available(table_id),
            !reserved,
            "table {} availability disagrees with ledger",
            table_id
        );
    }
}
