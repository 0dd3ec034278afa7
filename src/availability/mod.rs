//! Availability store
//!
//! Owns one record per table and is the only writer of each table's `available` flag.
//! Serves:
//! - `GET /tables/:table_id` (read by id)
//! - `PUT /tables/:table_id` (set availability by id)

pub mod http;
pub mod server;
pub mod store;

pub use server::AvailabilityServer;
pub use store::TableStore;
