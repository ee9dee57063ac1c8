//! Booking submission to the host's booking webhook.
//!
//! Booking failures never escape as errors: they come back as a
//! `BookingResponse` with `success == false` and a message the widget can
//! show, leaving the caller free to retry.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use meetslot_engine::MeetingType;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::{debug, error, info, warn};

/// Minimum length of the first and last name.
pub const MIN_NAME_CHARS: usize = 2;

/// Meeting category sent to the booking webhook.
const MEETING_CATEGORY: &str = "Reunión trabajo";

/// Local time format of the booking payload.
const PAYLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// What the visitor filled in on the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeDetails {
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A complete booking: attendee, chosen start, and meeting type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(flatten)]
    pub attendee: AttendeeDetails,
    pub start: DateTime<Utc>,
    pub meeting_type: MeetingType,
}

impl BookingRequest {
    pub fn new(attendee: AttendeeDetails, start: DateTime<Utc>, meeting_type: MeetingType) -> Self {
        Self {
            attendee,
            start,
            meeting_type,
        }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.meeting_type.duration_minutes()))
    }

    pub fn validate(&self) -> Result<()> {
        let a = &self.attendee;
        if a.name.trim().chars().count() < MIN_NAME_CHARS {
            return Err(ClientError::InvalidBooking(format!(
                "name must have at least {} characters",
                MIN_NAME_CHARS
            )));
        }
        if a.last_name.trim().chars().count() < MIN_NAME_CHARS {
            return Err(ClientError::InvalidBooking(format!(
                "last name must have at least {} characters",
                MIN_NAME_CHARS
            )));
        }
        if !EMAIL.is_match(a.email.trim()) {
            return Err(ClientError::InvalidBooking(format!(
                "invalid email '{}'",
                a.email
            )));
        }
        Ok(())
    }

    /// The webhook payload, with times rendered as local wall-clock in `tz`.
    fn payload(&self, tz: Tz) -> BookingPayload<'_> {
        let a = &self.attendee;
        BookingPayload {
            first_name: a.name.trim(),
            last_name: a.last_name.trim(),
            category: MEETING_CATEGORY,
            duration_minutes: self.meeting_type.duration_minutes(),
            start: self.start.with_timezone(&tz).format(PAYLOAD_TIME_FORMAT).to_string(),
            end: self.end().with_timezone(&tz).format(PAYLOAD_TIME_FORMAT).to_string(),
            email: a.email.trim(),
        }
    }
}

/// Wire shape expected by the booking webhook.
#[derive(Debug, Serialize)]
struct BookingPayload<'a> {
    #[serde(rename = "nombre")]
    first_name: &'a str,
    #[serde(rename = "apellido")]
    last_name: &'a str,
    #[serde(rename = "Tipo")]
    category: &'static str,
    #[serde(rename = "duracion")]
    duration_minutes: u32,
    #[serde(rename = "inicio")]
    start: String,
    #[serde(rename = "final")]
    end: String,
    email: &'a str,
}

/// Who booked and when, echoed back on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub name: String,
    pub start: DateTime<Utc>,
}

/// Terminal outcome of one booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub meeting_link: Option<String>,
    pub booking: Option<BookingSummary>,
}

impl BookingResponse {
    pub const BOOKED: &'static str = "Meeting booked successfully!";
    pub const INVALID: &'static str = "Invalid booking data.";
    pub const UNREACHABLE: &'static str = "Could not book the meeting.";

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            meeting_link: None,
            booking: None,
        }
    }

    pub fn booked(request: &BookingRequest, meeting_link: Option<String>) -> Self {
        Self {
            success: true,
            message: Self::BOOKED.to_string(),
            meeting_link,
            booking: Some(BookingSummary {
                name: request.attendee.name.trim().to_string(),
                start: request.start,
            }),
        }
    }
}

/// Destination for booking requests.
#[async_trait]
pub trait BookingSink: Send + Sync {
    /// Submit `request`. Never fails; problems are reported in the response.
    async fn book(&self, request: &BookingRequest) -> BookingResponse;
}

#[async_trait]
impl<T: BookingSink + ?Sized> BookingSink for Arc<T> {
    async fn book(&self, request: &BookingRequest) -> BookingResponse {
        (**self).book(request).await
    }
}

/// HTTP implementation backed by the booking webhook.
#[derive(Clone)]
pub struct HttpBooking {
    client: Client,
    url: String,
    timezone: Tz,
}

impl HttpBooking {
    pub fn new(client: Client, url: impl Into<String>, timezone: Tz) -> Self {
        Self {
            client,
            url: url.into(),
            timezone,
        }
    }

    /// Fallible submission. Returns the meeting link when the webhook sends one.
    pub async fn submit(&self, request: &BookingRequest) -> Result<Option<String>> {
        request.validate()?;
        let payload = request.payload(self.timezone);
        debug!("Submitting booking for {} at {}", payload.email, payload.start);

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Booking webhook error: {} - {}", status, body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(meeting_link_from(&body))
    }
}

#[async_trait]
impl BookingSink for HttpBooking {
    async fn book(&self, request: &BookingRequest) -> BookingResponse {
        match self.submit(request).await {
            Ok(link) => {
                info!("Booked meeting at {}", request.start);
                BookingResponse::booked(request, link)
            }
            Err(ClientError::InvalidBooking(reason)) => {
                warn!("Rejected booking: {}", reason);
                BookingResponse::failure(BookingResponse::INVALID)
            }
            Err(ClientError::Status { status, .. }) => {
                let reason = reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map_or_else(|| status.to_string(), str::to_string);
                BookingResponse::failure(format!("Server error: {}", reason))
            }
            Err(e) => {
                warn!("Booking failed: {}", e);
                BookingResponse::failure(BookingResponse::UNREACHABLE)
            }
        }
    }
}

/// The webhook may answer with JSON carrying `meetingLink`, or with plain text.
fn meeting_link_from(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let link = match &value {
        Value::Array(items) => items.first()?.get("meetingLink")?,
        other => other.get("meetingLink")?,
    };
    link.as_str().filter(|s| !s.is_empty()).map(str::to_string)
}
