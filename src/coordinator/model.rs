//! Reservation, waitlist and outcome types owned by the coordinator

use crate::common::{validate_id, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ReservationId = String;

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationKind {
    Reserve,
    Cancel,
}

impl FromStr for ReservationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reserve" => Ok(ReservationKind::Reserve),
            "cancel" => Ok(ReservationKind::Cancel),
            other => Err(Error::InvalidReservationType(other.to_string())),
        }
    }
}

impl fmt::Display for ReservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationKind::Reserve => write!(f, "reserve"),
            ReservationKind::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
}

/// An active booking of one table by one customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub table_id: String,
    pub customer_id: String,
    pub status: ReservationStatus,
}

/// A customer queued for a table. Preferences are carried along but never reorder the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub customer_id: String,
    #[serde(default)]
    pub preferences: Vec<String>,
}

impl WaitlistEntry {
    pub fn new(customer_id: impl Into<String>, preferences: Vec<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            preferences,
        }
    }
}

/// A cancellation that was applied locally while the table could not be released remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Divergence {
    pub table_id: String,
    pub reservation_id: ReservationId,
    pub customer_id: String,
    pub cause: String,
    pub flagged_at: DateTime<Utc>,
}

/// What reconciling a flagged table did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ReconcileAction {
    /// The table had no divergence on record
    NothingPending,
    /// Someone holds the table again; the store was left (or set) unavailable
    Occupied { reservation: Reservation },
    /// The waitlist head took the seat; the store stays unavailable
    Promoted { reservation: Reservation },
    /// Nobody wants the table; the store now shows it available
    Released,
}

/// Inbound request, as posted to `/reservations`.
///
/// Every field defaults so malformed bodies reach validation instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[serde(default)]
    pub table_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub reservation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<String>>,
}

impl ReservationRequest {
    pub fn reserve(table_id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self::new(table_id, customer_id, ReservationKind::Reserve)
    }

    pub fn cancel(table_id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self::new(table_id, customer_id, ReservationKind::Cancel)
    }

    fn new(
        table_id: impl Into<String>,
        customer_id: impl Into<String>,
        kind: ReservationKind,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            customer_id: customer_id.into(),
            reservation_type: kind.to_string(),
            preferences: None,
        }
    }

    pub fn with_preferences<I, S>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences = Some(preferences.into_iter().map(Into::into).collect());
        self
    }

    /// Check the request shape and resolve its kind. Touches no state.
    pub fn validate(&self) -> Result<ReservationKind> {
        let kind = self.reservation_type.parse()?;
        validate_id("tableId", &self.table_id)?;
        validate_id("customerId", &self.customer_id)?;
        Ok(kind)
    }
}

/// Result of a successfully processed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    Confirmed {
        reservation_id: ReservationId,
        table_id: String,
    },
    Waitlisted {
        table_id: String,
        /// 1-based
        position: usize,
    },
    Cancelled {
        reservation_id: ReservationId,
        table_id: String,
    },
    CancelledWithPromotion {
        reservation_id: ReservationId,
        table_id: String,
        promoted_customer_id: String,
        new_reservation_id: ReservationId,
    },
    RemovedFromWaitlist {
        table_id: String,
    },
}

impl ReservationOutcome {
    /// Wire `status` value
    pub fn status(&self) -> &'static str {
        match self {
            ReservationOutcome::Confirmed { .. } => "success",
            ReservationOutcome::Waitlisted { .. } => "waitlisted",
            ReservationOutcome::Cancelled { .. }
            | ReservationOutcome::CancelledWithPromotion { .. }
            | ReservationOutcome::RemovedFromWaitlist { .. } => "cancelled",
        }
    }

    pub fn table_id(&self) -> &str {
        match self {
            ReservationOutcome::Confirmed { table_id, .. }
            | ReservationOutcome::Waitlisted { table_id, .. }
            | ReservationOutcome::Cancelled { table_id, .. }
            | ReservationOutcome::CancelledWithPromotion { table_id, .. }
            | ReservationOutcome::RemovedFromWaitlist { table_id } => table_id,
        }
    }

    /// Human-readable summary
    pub fn message(&self) -> String {
        match self {
            ReservationOutcome::Confirmed { reservation_id, .. } => {
                format!("Reservation {} confirmed.", reservation_id)
            }
            ReservationOutcome::Waitlisted { position, .. } => {
                format!("You are #{} in the queue.", position)
            }
            ReservationOutcome::Cancelled { .. } => {
                "Reservation cancelled and table is now available.".to_string()
            }
            ReservationOutcome::CancelledWithPromotion {
                promoted_customer_id,
                new_reservation_id,
                ..
            } => format!(
                "Reservation cancelled. Customer {} has been confirmed from the waitlist as {}.",
                promoted_customer_id, new_reservation_id
            ),
            ReservationOutcome::RemovedFromWaitlist { .. } => "Removed from waitlist.".to_string(),
        }
    }

    pub fn to_response(&self) -> ReservationResponse {
        let (reservation_id, table_id, message, waitlist_message) = match self {
            ReservationOutcome::Confirmed {
                reservation_id,
                table_id,
            } => (Some(reservation_id.clone()), Some(table_id.clone()), None, None),
            ReservationOutcome::Waitlisted { .. } => (None, None, None, Some(self.message())),
            ReservationOutcome::Cancelled {
                reservation_id,
                table_id,
            }
            | ReservationOutcome::CancelledWithPromotion {
                reservation_id,
                table_id,
                ..
            } => (
                Some(reservation_id.clone()),
                Some(table_id.clone()),
                Some(self.message()),
                None,
            ),
            ReservationOutcome::RemovedFromWaitlist { table_id } => {
                (None, Some(table_id.clone()), Some(self.message()), None)
            }
        };

        ReservationResponse {
            reservation_id,
            status: self.status().to_string(),
            table_id,
            message,
            waitlist_message,
        }
    }
}

/// Response body of `POST /reservations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: Option<ReservationId>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waitlist_message: Option<String>,
}
