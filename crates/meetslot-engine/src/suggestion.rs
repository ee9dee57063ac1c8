//! Request and response model for "smart" meeting-time suggestions.
//!
//! The suggestion service itself is an opaque remote function. This module
//! owns what crosses that boundary: the scheduling context sent out, and the
//! list of `{start, end}` local date-times (`YYYY-MM-DDTHH:MM:SS`) that comes back.

use crate::error::{Result, SlotError};
use crate::window::{parse_clock, parse_timezone, resolve_local};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed text format of suggested start/end times.
pub const SUGGESTION_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Shortest meeting the suggestion form accepts.
pub const MIN_SUGGESTION_DURATION_MINUTES: u32 = 15;

/// A recurring daily break, as clock times (`"12:00"` - `"13:00"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPeriod {
    pub start: String,
    pub end: String,
}

impl BreakPeriod {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The lunch break the widget always sends.
    pub fn lunch() -> Self {
        Self::new("12:00", "13:00")
    }

    fn validate(&self) -> Result<()> {
        let invalid = || SlotError::InvalidBreak(format!("{} - {}", self.start, self.end));
        let start = parse_clock(&self.start).map_err(|_| invalid())?;
        let end = parse_clock(&self.end).map_err(|_| invalid())?;
        if start >= end {
            return Err(invalid());
        }
        Ok(())
    }
}

/// Scheduling context handed to the suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub user_time_zone: String,
    pub host_time_zone: String,
    pub common_breaks: Vec<BreakPeriod>,
    pub typical_meeting_duration: u32,
    pub available_days: Vec<NaiveDate>,
}

impl SuggestionRequest {
    /// The widget's default request: a lunch break and the `days` days after `today`.
    pub fn for_next_days(
        today: NaiveDate,
        user_time_zone: impl Into<String>,
        host_time_zone: impl Into<String>,
        typical_meeting_duration: u32,
        days: u32,
    ) -> Self {
        let available_days = (1..=u64::from(days))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .collect();
        Self {
            user_time_zone: user_time_zone.into(),
            host_time_zone: host_time_zone.into(),
            common_breaks: vec![BreakPeriod::lunch()],
            typical_meeting_duration,
            available_days,
        }
    }

    pub fn validate(&self) -> Result<()> {
        parse_timezone(&self.user_time_zone)?;
        parse_timezone(&self.host_time_zone)?;
        if self.typical_meeting_duration < MIN_SUGGESTION_DURATION_MINUTES {
            return Err(SlotError::InvalidDuration(format!(
                "meeting duration must be at least {} minutes, got {}",
                MIN_SUGGESTION_DURATION_MINUTES, self.typical_meeting_duration
            )));
        }
        for b in &self.common_breaks {
            b.validate()?;
        }
        Ok(())
    }

    /// Drop suggestions that are empty/inverted or fall outside `available_days`.
    pub fn retain_valid(&self, suggestions: Vec<SuggestedSlot>) -> Vec<SuggestedSlot> {
        suggestions
            .into_iter()
            .filter(|s| s.end > s.start)
            .filter(|s| {
                self.available_days.is_empty() || self.available_days.contains(&s.start.date())
            })
            .collect()
    }
}

/// One suggested meeting time, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SuggestedSlot {
    #[serde(with = "suggestion_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "suggestion_datetime")]
    pub end: NaiveDateTime,
}

impl SuggestedSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// The suggested start as an instant, reading the local time in `tz`.
    pub fn start_in(&self, tz: chrono_tz::Tz) -> DateTime<Utc> {
        resolve_local(tz, self.start)
    }
}

/// Parse the suggestion service's output into slots.
///
/// Accepts a bare JSON array of `{start, end}` objects, optionally wrapped in
/// a Markdown code fence as language models tend to produce.
pub fn parse_suggestions(text: &str) -> Result<Vec<SuggestedSlot>> {
    let body = strip_code_fence(text.trim());
    let json = match (body.find('['), body.rfind(']')) {
        (Some(open), Some(close)) if open < close => &body[open..=close],
        _ => {
            return Err(SlotError::SuggestionParse(
                "no JSON array in suggestion output".to_string(),
            ))
        }
    };
    serde_json::from_str(json).map_err(|e| SlotError::SuggestionParse(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Serde adapter for the `YYYY-MM-DDTHH:MM:SS` wire format.
///
/// Deserialization also tolerates a missing seconds field and an RFC 3339
/// offset suffix (the local part is kept).
mod suggestion_datetime {
    use super::SUGGESTION_DATETIME_FORMAT;
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(SUGGESTION_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, SUGGESTION_DATETIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M"))
            .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_local()))
            .map_err(|_| de::Error::custom(format!("invalid suggestion datetime '{}'", raw)))
    }
}
