//! Error types for meetslot-client.

use chrono::{DateTime, NaiveDate, Utc};
use meetslot_engine::SlotError;
use thiserror::Error;

/// Errors from the external collaborators and configuration.
///
/// The fail-open entry points (`busy_intervals`, `book`, `suggest`) never
/// return these; they log them and degrade instead.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid booking: {0}")]
    InvalidBooking(String),

    #[error(transparent)]
    Slot(#[from] SlotError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from driving the booking flow out of order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("Slot {0} is not available")]
    SlotUnavailable(DateTime<Utc>),

    #[error("A booking is already being submitted")]
    SubmissionPending,

    #[error("Action requires step {expected}, flow is at {actual}")]
    WrongStep {
        expected: &'static str,
        actual: &'static str,
    },
}
