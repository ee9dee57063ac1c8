//! Working-hours window for a single calendar day.
//!
//! Resolves local clock times ("09:00", "18:00") on a given date to UTC
//! instants in one IANA timezone. DST transitions are handled the same way a
//! wall-clock calendar would:
//!
//! - ambiguous local times (fall-back overlap) resolve to the earliest instant;
//! - non-existent local times (spring-forward gap) shift forward by the gap length.

use crate::error::{Result, SlotError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

const DEFAULT_OPEN: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("invalid opening time"),
};

const DEFAULT_CLOSE: NaiveTime = match NaiveTime::from_hms_opt(18, 0, 0) {
    Some(t) => t,
    None => panic!("invalid closing time"),
};

/// Gaps never exceed a few hours, so probing this far back lands before any transition.
const GAP_PROBE_HOURS: i64 = 3;

/// Daily opening and closing clock times of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN,
            close: DEFAULT_CLOSE,
        }
    }
}

impl WorkingHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if open >= close {
            return Err(SlotError::InvalidWorkingHours(format!(
                "opening time {} must be before closing time {}",
                open.format("%H:%M"),
                close.format("%H:%M")
            )));
        }
        Ok(Self { open, close })
    }

    /// Parse `HH:MM` clock strings (e.g. `"09:00"`, `"18:00"`).
    pub fn parse(open: &str, close: &str) -> Result<Self> {
        Self::new(parse_clock(open)?, parse_clock(close)?)
    }
}

/// The bookable bounds of one day, as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingWindow {
    pub day_start: DateTime<Utc>,
    pub day_end: DateTime<Utc>,
}

impl WorkingWindow {
    pub fn for_date(date: NaiveDate, hours: &WorkingHours, tz: Tz) -> Self {
        Self {
            day_start: resolve_local(tz, date.and_time(hours.open)),
            day_end: resolve_local(tz, date.and_time(hours.close)),
        }
    }

    /// Whether `[start, end]` lies entirely inside the window.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.day_start <= start && end <= self.day_end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.day_end - self.day_start).num_minutes()
    }
}

/// Resolve a local wall-clock datetime in `tz` to a UTC instant.
pub fn resolve_local(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&local).earliest() {
        return dt.with_timezone(&Utc);
    }
    // Inside a spring-forward gap: apply the offset in force before the gap.
    let probe = local - Duration::hours(GAP_PROBE_HOURS);
    let offset_secs = tz
        .from_local_datetime(&probe)
        .earliest()
        .map(|before| before.offset().fix().local_minus_utc())
        .unwrap_or(0);
    (local - Duration::seconds(i64::from(offset_secs))).and_utc()
}

/// The calendar date of `instant` as seen in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Whether `instant` falls on `date` in `tz`.
pub fn is_same_local_day(instant: DateTime<Utc>, date: NaiveDate, tz: Tz) -> bool {
    local_date(instant, tz) == date
}

/// Parse an IANA timezone identifier such as `"Europe/London"`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}

/// Parse a `HH:MM` (or `HH:MM:SS`) clock time.
pub fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| SlotError::InvalidWorkingHours(format!("invalid clock time '{}'", s)))
}

/// UTC bounds of the whole local calendar day `[00:00, next 00:00)` in `tz`.
pub fn local_day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = date.and_time(NaiveTime::default());
    (
        resolve_local(tz, midnight),
        resolve_local(tz, midnight + Duration::days(1)),
    )
}
