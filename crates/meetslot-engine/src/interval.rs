//! Half-open time intervals: host busy periods and bookable candidate slots.

use crate::error::{Result, SlotError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range during which the host is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Build a busy interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(SlotError::InvalidInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A bookable slot. `end` is always `start + duration` for the generating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CandidateSlot {
    pub fn new(start: DateTime<Utc>, duration_minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(duration_minutes)),
        }
    }

    /// Whether this slot conflicts with `busy` (touching endpoints do not).
    pub fn overlaps(&self, busy: &BusyInterval) -> bool {
        overlaps(self.start, self.end, busy.start, busy.end)
    }
}

/// Exclusive-boundary overlap test for two half-open intervals.
///
/// `[a_start, a_end)` and `[b_start, b_end)` overlap iff they share more than
/// a single boundary point, so back-to-back ranges are not a conflict.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}
