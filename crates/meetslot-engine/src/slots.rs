//! Bookable slot generation.
//!
//! Given a day, the host's busy intervals, a meeting duration, and the current
//! instant, enumerate candidate start times on a fixed step across the working
//! window and keep the ones that:
//!
//! - do not start before `now` (a start equal to `now` is still bookable);
//! - end no later than the close of the working window;
//! - do not overlap any busy interval of that day (touching endpoints are fine,
//!   so meetings can be booked back-to-back).
//!
//! The generator is a pure function of its request. It never fails: a fully
//! booked day, or a degenerate request, simply yields no slots.

use crate::error::{Result, SlotError};
use crate::interval::{overlaps, BusyInterval, CandidateSlot};
use crate::meeting::MeetingType;
use crate::window::{local_day_bounds, WorkingHours, WorkingWindow};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Spacing between candidate start times, in minutes.
pub const DEFAULT_STEP_MINUTES: u32 = 30;

/// Everything the generator needs for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The calendar day being queried, in `timezone`.
    pub date: NaiveDate,
    /// Host busy intervals. May include other days; those are ignored.
    pub busy_intervals: Vec<BusyInterval>,
    pub duration_minutes: u32,
    pub step_minutes: u32,
    /// Evaluation instant used to exclude slots that already started.
    pub now: DateTime<Utc>,
    pub hours: WorkingHours,
    /// The single local timezone of this call.
    pub timezone: Tz,
}

impl GenerationRequest {
    /// A request with no busy intervals, a 30-minute step, 09:00-18:00 hours in UTC.
    pub fn new(date: NaiveDate, duration_minutes: u32, now: DateTime<Utc>) -> Self {
        Self {
            date,
            busy_intervals: Vec::new(),
            duration_minutes,
            step_minutes: DEFAULT_STEP_MINUTES,
            now,
            hours: WorkingHours::default(),
            timezone: Tz::UTC,
        }
    }

    pub fn for_meeting(date: NaiveDate, meeting_type: MeetingType, now: DateTime<Utc>) -> Self {
        Self::new(date, meeting_type.duration_minutes(), now)
    }

    pub fn with_busy(mut self, busy_intervals: Vec<BusyInterval>) -> Self {
        self.busy_intervals = busy_intervals;
        self
    }

    pub fn with_step(mut self, step_minutes: u32) -> Self {
        self.step_minutes = step_minutes;
        self
    }

    pub fn with_hours(mut self, hours: WorkingHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// The working window of `date`.
    pub fn window(&self) -> WorkingWindow {
        WorkingWindow::for_date(self.date, &self.hours, self.timezone)
    }

    /// Busy intervals that intersect the requested local day.
    pub fn same_day_busy(&self) -> Vec<BusyInterval> {
        let (day_start, day_end) = local_day_bounds(self.date, self.timezone);
        self.busy_intervals
            .iter()
            .filter(|b| overlaps(b.start, b.end, day_start, day_end))
            .copied()
            .collect()
    }

    /// Report the request parameters the generator would silently treat as "no slots".
    pub fn validate(&self) -> Result<()> {
        if self.duration_minutes == 0 {
            return Err(SlotError::InvalidDuration(
                "meeting duration must be positive".to_string(),
            ));
        }
        if self.step_minutes == 0 {
            return Err(SlotError::InvalidStep(
                "step must be positive".to_string(),
            ));
        }
        if self.hours.open >= self.hours.close {
            return Err(SlotError::InvalidWorkingHours(format!(
                "opening time {} must be before closing time {}",
                self.hours.open.format("%H:%M"),
                self.hours.close.format("%H:%M")
            )));
        }
        Ok(())
    }
}

/// Generate the ordered bookable slots for `request`.
///
/// Candidates start at the window's opening time and advance by
/// `step_minutes` up to and including the closing time; the filters described
/// in the module docs are then applied. Output is strictly ascending by start.
pub fn generate_slots(request: &GenerationRequest) -> Vec<CandidateSlot> {
    if request.duration_minutes == 0 || request.step_minutes == 0 {
        return Vec::new();
    }

    let window = request.window();
    let busy = request.same_day_busy();
    let step = Duration::minutes(i64::from(request.step_minutes));

    let mut slots = Vec::new();
    let mut start = window.day_start;
    while start <= window.day_end {
        let slot = CandidateSlot::new(start, request.duration_minutes);
        let in_future = slot.start >= request.now;
        let fits = slot.end <= window.day_end;
        if in_future && fits && !busy.iter().any(|b| slot.overlaps(b)) {
            slots.push(slot);
        }
        start += step;
    }

    slots
}

/// Slot start times only, which is what the widget renders as buttons.
pub fn generate_start_times(request: &GenerationRequest) -> Vec<DateTime<Utc>> {
    generate_slots(request).into_iter().map(|s| s.start).collect()
}
