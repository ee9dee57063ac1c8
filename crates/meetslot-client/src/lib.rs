//! meetslot-client: external collaborators of the booking widget
//!
//! This crate talks to the three remote services the scheduler depends on
//! and drives the visitor's booking flow on top of `meetslot-engine`.
//!
//! ## Features
//!
//! - Availability lookup (busy intervals per day), failing open to an empty set
//! - Booking submission with a user-visible success/failure message
//! - Smart meeting-time suggestions from a language model, failing to an empty list
//! - `BookingFlow`: date → time → form → confirmed, one submission in flight
//! - TOML + environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meetslot_client::{BookingFlow, ClientConfig, HttpAvailability, HttpBooking};
//!
//! let config = ClientConfig::load(None)?;
//! let http = config.http_client()?;
//! let tz = config.timezone()?;
//! let flow = BookingFlow::new(
//!     HttpAvailability::new(http.clone(), &config.availability_url),
//!     HttpBooking::new(http, &config.booking_url, tz),
//!     tz,
//! );
//!
//! let slots = flow.select_date(date, chrono::Utc::now()).await?;
//! flow.select_time(slots[0].start)?;
//! let response = flow.submit(attendee).await?;
//! ```

pub mod availability;
pub mod booking;
pub mod config;
pub mod error;
pub mod flow;
pub mod suggestions;

pub use availability::{AvailabilitySource, HttpAvailability, StaticAvailability};
pub use booking::{AttendeeDetails, BookingRequest, BookingResponse, BookingSink, HttpBooking};
pub use config::{ClientConfig, LlmConfig};
pub use error::{ClientError, FlowError, Result};
pub use flow::{BookingFlow, Step};
pub use suggestions::{render_prompt, LlmSuggestions, SuggestionSource};
