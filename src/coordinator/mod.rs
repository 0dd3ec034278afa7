//! Reservation coordinator
//!
//! The coordinator is responsible for:
//! - Reservation and waitlist records (the ledger)
//! - Deciding reserve/cancel outcomes against the availability store
//! - Serialising requests per table so a table is never double-booked
//! - Promoting waitlisted customers when a seat is vacated
//! - Tracking and reconciling cancellations whose table release failed

pub mod availability_client;
pub mod engine;
pub mod http;
pub mod ledger;
pub mod locks;
pub mod model;
pub mod seed;
pub mod server;

pub use availability_client::{AvailabilityClient, HttpAvailabilityClient};
pub use engine::ReservationEngine;
pub use ledger::{MemLedger, ReservationLedger};
pub use model::{
    Divergence, ReconcileAction, Reservation, ReservationKind, ReservationOutcome,
    ReservationRequest, ReservationResponse, WaitlistEntry,
};
pub use server::{AvailabilitySource, Coordinator};
