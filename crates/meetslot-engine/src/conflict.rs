//! Detect which busy intervals a proposed meeting would collide with.
//!
//! Used to re-check a user-chosen time (e.g. one picked from a smart
//! suggestion) against the host's calendar before booking.
//! Adjacent intervals (where one ends exactly when another starts) are NOT conflicts.

use crate::interval::{overlaps, BusyInterval, CandidateSlot};

/// A detected conflict between a proposed slot and a busy interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub busy: BusyInterval,
    pub overlap_minutes: i64,
}

/// Find every busy interval that overlaps `slot`.
///
/// The overlap duration is `min(slot.end, busy.end) - max(slot.start, busy.start)`.
pub fn find_conflicts(slot: &CandidateSlot, busy: &[BusyInterval]) -> Vec<Conflict> {
    busy.iter()
        .filter(|b| overlaps(slot.start, slot.end, b.start, b.end))
        .map(|b| {
            let overlap_start = slot.start.max(b.start);
            let overlap_end = slot.end.min(b.end);
            Conflict {
                busy: *b,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}

/// Convenience check: `true` when `slot` collides with none of `busy`.
pub fn is_free(slot: &CandidateSlot, busy: &[BusyInterval]) -> bool {
    !busy.iter().any(|b| slot.overlaps(b))
}
