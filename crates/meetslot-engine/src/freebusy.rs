//! Free windows of a working day.
//!
//! Sorts the day's busy intervals, merges overlapping or adjacent ones, then
//! computes the gaps between them inside the remaining part of the working
//! window (from `max(day_start, now)` to `day_end`).

use crate::interval::BusyInterval;
use crate::slots::GenerationRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous stretch of free time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl FreeWindow {
    fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

/// Merge overlapping or adjacent busy periods, clipped to the given window.
///
/// `free_windows` passes the request's same-day busy set, so intervals of
/// other days never reach the merge. Returns a sorted, non-overlapping list
/// of (start, end) intervals.
pub fn merge_busy_periods(
    busy: &[BusyInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    // Collect intervals clipped to the window, discarding ones entirely outside.
    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = busy
        .iter()
        .filter(|b| b.start < window_end && b.end > window_start)
        .map(|b| (b.start.max(window_start), b.end.min(window_end)))
        .collect();

    if intervals.is_empty() {
        return Vec::new();
    }

    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Free windows of the requested day, sorted by start time.
///
/// Busy intervals of other days are ignored, and time before `now` is never
/// reported as free.
pub fn free_windows(request: &GenerationRequest) -> Vec<FreeWindow> {
    let window = request.window();
    let window_start = window.day_start.max(request.now);
    let window_end = window.day_end;
    if window_start >= window_end {
        return Vec::new();
    }

    let merged = merge_busy_periods(&request.same_day_busy(), window_start, window_end);

    let mut free = Vec::new();
    let mut cursor = window_start;
    for (busy_start, busy_end) in merged {
        if cursor < busy_start {
            free.push(FreeWindow::between(cursor, busy_start));
        }
        cursor = cursor.max(busy_end);
    }

    // Trailing gap after the last busy period.
    if cursor < window_end {
        free.push(FreeWindow::between(cursor, window_end));
    }

    free
}

/// The first free window at least `min_duration_minutes` long.
pub fn first_free_window(
    request: &GenerationRequest,
    min_duration_minutes: i64,
) -> Option<FreeWindow> {
    free_windows(request)
        .into_iter()
        .find(|w| w.duration_minutes >= min_duration_minutes)
}
