//! Wire model shared by the coordinator and the availability store

use serde::{Deserialize, Serialize};

/// A seating unit as the availability store reports it.
///
/// `available` is authoritative: the coordinator reads and commands it but never derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub table_id: String,
    pub capacity: u32,
    pub location: String,
    pub available: bool,
}

impl Table {
    pub fn new(table_id: impl Into<String>, capacity: u32, location: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            capacity,
            location: location.into(),
            available: true,
        }
    }

    pub fn occupied(mut self) -> Self {
        self.available = false;
        self
    }
}

/// Body of `PUT /tables/:tableId`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub available: bool,
}
