//! Error types for tableside

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    #[error("Invalid reservation type: {0}")]
    InvalidReservationType(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    // === Lookup Errors ===
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Reservation not found for cancellation")]
    ReservationNotFound { table_id: String, customer_id: String },

    // === Upstream Errors ===
    #[error("Availability store unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Availability store did not answer within {0:?}")]
    UpstreamTimeout(Duration),

    #[error(
        "Reservation {reservation_id} cancelled but table {table_id} could not be released: {cause}"
    )]
    ReleaseDiverged {
        table_id: String,
        reservation_id: String,
        cause: String,
    },

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    UpstreamUnavailable,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidReservationType(_) | Error::Validation(_) => ErrorKind::Validation,
            Error::TableNotFound(_) | Error::ReservationNotFound { .. } => ErrorKind::NotFound,
            Error::UpstreamUnavailable(_)
            | Error::UpstreamTimeout(_)
            | Error::ReleaseDiverged { .. } => ErrorKind::UpstreamUnavailable,
            Error::Io(_) | Error::InvalidConfig(_) | Error::Internal(_) | Error::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Local and remote state disagree and an operator has to reconcile.
    pub fn needs_reconciliation(&self) -> bool {
        matches!(self, Error::ReleaseDiverged { .. })
    }

    /// Stable machine-readable code for API bodies
    pub fn code(&self) -> &'static str {
        if self.needs_reconciliation() {
            return "reconciliation_required";
        }
        match self.kind() {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::Internal => "internal_error",
        }
    }

    /// Convert to HTTP status code
    pub fn to_http_status(&self) -> StatusCode {
        match self {
            Error::ReleaseDiverged { .. } => StatusCode::BAD_GATEWAY,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.to_http_status();
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let Error::ReleaseDiverged {
            table_id,
            reservation_id,
            ..
        } = &self
        {
            body["tableId"] = json!(table_id);
            body["reservationId"] = json!(reservation_id);
        }
        (status, axum::Json(body)).into_response()
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::UpstreamUnavailable(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}
