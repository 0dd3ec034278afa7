//! # tableside
//!
//! Restaurant seating reservations coordinated across two services:
//! - An availability store that owns each table's `available` flag
//! - A reservation coordinator that owns reservations and per-table FIFO waitlists
//! - Per-table serialisation so concurrent requests never double-book
//! - Waitlist promotion on cancellation, without an intermediate "free" state
//! - Divergence tracking and reconciliation when a table release fails
//!
//! ## Architecture
//!
//! ```text
//!   client
//!     │  POST /reservations
//! ┌───▼─────────────────────────────────┐
//! │       Reservation Coordinator       │
//! │  lock(table) → read → decide →      │
//! │  write → ledger                     │
//! │   - reservations                    │
//! │   - waitlists (FIFO per table)      │
//! │   - divergences                     │
//! └───────────┬─────────────────────────┘
//!             │ HTTP: GET/PUT /tables/:id
//! ┌───────────▼─────────────────────────┐
//! │         Availability Store          │
//! │  T001 4 Window   available          │
//! │  T002 2 Corner   taken              │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Start the availability store
//! ```bash
//! tableside-availability serve --bind 0.0.0.0:3000
//! ```
//!
//! ### Start the coordinator
//! ```bash
//! tableside-coord serve \
//!   --bind 0.0.0.0:3001 \
//!   --availability http://localhost:3000 \
//!   --upstream-timeout 2s
//! ```
//!
//! ### Use the CLI
//! ```bash
//! tableside reserve T001 C104 --pref Window
//! tableside cancel T001 C104
//! tableside waitlist T002
//! tableside divergences
//! tableside reconcile T001
//! ```

pub mod availability;
pub mod common;
pub mod coordinator;

// Re-export commonly used types
pub use availability::AvailabilityServer;
pub use common::{Config, Error, Result};
pub use coordinator::{Coordinator, ReservationEngine};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
