//! Meeting types offered by the booking widget.

use crate::error::SlotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of meeting a visitor can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    /// Quick 30-minute call.
    #[default]
    Short,
    /// 60-minute working session.
    Work,
}

impl MeetingType {
    pub fn duration_minutes(self) -> u32 {
        match self {
            MeetingType::Short => 30,
            MeetingType::Work => 60,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        match minutes {
            30 => Some(MeetingType::Short),
            60 => Some(MeetingType::Work),
            _ => None,
        }
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingType::Short => write!(f, "short"),
            MeetingType::Work => write!(f, "work"),
        }
    }
}

/// Accepts either the minute count (`"30"`, `"60"`) or the name (`"short"`, `"work"`).
impl FromStr for MeetingType {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "30" | "short" => Ok(MeetingType::Short),
            "60" | "work" => Ok(MeetingType::Work),
            other => Err(SlotError::InvalidMeetingType(other.to_string())),
        }
    }
}
