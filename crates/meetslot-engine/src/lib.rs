//! # meetslot-engine
//!
//! Deterministic bookable-slot generation for a meeting-scheduling widget.
//!
//! Given a calendar day, the host's busy intervals, a meeting duration, and the
//! current instant, the engine derives the ordered set of start times a visitor
//! can book: inside working hours, not in the past, and never overlapping a
//! busy interval (back-to-back meetings are allowed).
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use meetslot_engine::{generate_slots, BusyInterval, GenerationRequest};
//!
//! let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
//! let now = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
//! let lunch = BusyInterval::new(
//!     Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap(),
//! )
//! .unwrap();
//!
//! let request = GenerationRequest::new(date, 30, now).with_busy(vec![lunch]);
//! let slots = generate_slots(&request);
//! assert_eq!(slots.len(), 16);
//! ```
//!
//! ## Modules
//!
//! - [`slots`]: the slot generator and its request type
//! - [`window`]: working hours and local-time resolution
//! - [`interval`]: busy intervals, candidate slots, overlap test
//! - [`conflict`]: which busy intervals a proposed slot collides with
//! - [`freebusy`]: free windows of a working day
//! - [`meeting`]: meeting types (30 / 60 minutes)
//! - [`suggestion`]: smart-suggestion request/response model
//! - [`error`]: Error types

pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod interval;
pub mod meeting;
pub mod slots;
pub mod suggestion;
pub mod window;

pub use conflict::{find_conflicts, Conflict};
pub use error::SlotError;
pub use freebusy::{first_free_window, free_windows, FreeWindow};
pub use interval::{BusyInterval, CandidateSlot};
pub use meeting::MeetingType;
pub use slots::{generate_slots, generate_start_times, GenerationRequest, DEFAULT_STEP_MINUTES};
pub use suggestion::{parse_suggestions, BreakPeriod, SuggestedSlot, SuggestionRequest};
pub use window::{WorkingHours, WorkingWindow};
