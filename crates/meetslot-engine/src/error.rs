//! Error types for meetslot-engine validation helpers.
//!
//! Slot generation itself is total; these errors are only produced by the
//! constructors and `validate()` methods that callers opt into.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: String, end: String },

    #[error("Invalid working hours: {0}")]
    InvalidWorkingHours(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid break period: {0}")]
    InvalidBreak(String),

    #[error("Invalid meeting type: {0}")]
    InvalidMeetingType(String),

    #[error("Suggestion parse error: {0}")]
    SuggestionParse(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
