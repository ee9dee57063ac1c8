//! The visitor's booking flow: pick a date, pick a time, fill the form, confirm.
//!
//! `BookingFlow` is shared by reference between UI events. State lives behind
//! a mutex that is never held across an await; a separate flag guarantees at
//! most one booking submission in flight.

use crate::availability::AvailabilitySource;
use crate::booking::{AttendeeDetails, BookingRequest, BookingResponse, BookingSink};
use crate::error::FlowError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use meetslot_engine::window::local_date;
use meetslot_engine::{
    generate_slots, BusyInterval, CandidateSlot, GenerationRequest, MeetingType, SuggestedSlot,
    WorkingHours, DEFAULT_STEP_MINUTES,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Where the visitor is in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    SelectDate,
    SelectTime,
    Form,
    Confirmed,
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Step::SelectDate => "select-date",
            Step::SelectTime => "select-time",
            Step::Form => "form",
            Step::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Default)]
struct FlowState {
    step: Step,
    meeting_type: MeetingType,
    date: Option<NaiveDate>,
    time: Option<DateTime<Utc>>,
    busy: Vec<BusyInterval>,
    slots: Vec<CandidateSlot>,
    confirmation: Option<BookingResponse>,
}

/// Clears the in-flight flag when the submission finishes, however it ends.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BookingFlow<A, B> {
    availability: A,
    booking: B,
    timezone: Tz,
    hours: WorkingHours,
    step_minutes: u32,
    state: Mutex<FlowState>,
    submitting: AtomicBool,
}

impl<A: AvailabilitySource, B: BookingSink> BookingFlow<A, B> {
    pub fn new(availability: A, booking: B, timezone: Tz) -> Self {
        Self {
            availability,
            booking,
            timezone,
            hours: WorkingHours::default(),
            step_minutes: DEFAULT_STEP_MINUTES,
            state: Mutex::new(FlowState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn with_hours(mut self, hours: WorkingHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_step(mut self, step_minutes: u32) -> Self {
        self.step_minutes = step_minutes;
        self
    }

    fn state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slots_for(&self, date: NaiveDate, state: &FlowState, now: DateTime<Utc>) -> Vec<CandidateSlot> {
        let request = GenerationRequest::for_meeting(date, state.meeting_type, now)
            .with_step(self.step_minutes)
            .with_hours(self.hours)
            .with_timezone(self.timezone)
            .with_busy(state.busy.clone());
        generate_slots(&request)
    }

    pub fn step(&self) -> Step {
        self.state().step
    }

    pub fn meeting_type(&self) -> MeetingType {
        self.state().meeting_type
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.state().date
    }

    pub fn selected_time(&self) -> Option<DateTime<Utc>> {
        self.state().time
    }

    pub fn slots(&self) -> Vec<CandidateSlot> {
        self.state().slots.clone()
    }

    pub fn confirmation(&self) -> Option<BookingResponse> {
        self.state().confirmation.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Switch between short and working meetings, regenerating the day's slots.
    ///
    /// A previously chosen time that no longer fits is dropped.
    pub fn select_meeting_type(&self, meeting_type: MeetingType, now: DateTime<Utc>) {
        let mut state = self.state();
        state.meeting_type = meeting_type;
        if let Some(date) = state.date {
            state.slots = self.slots_for(date, &state, now);
            let still_valid = state
                .time
                .is_some_and(|t| state.slots.iter().any(|s| s.start == t));
            if !still_valid && state.step == Step::Form {
                state.time = None;
                state.step = Step::SelectTime;
            }
        }
    }

    /// Load the host's availability for `date` and compute its slots.
    pub async fn select_date(
        &self,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<CandidateSlot>, FlowError> {
        if date < local_date(now, self.timezone) {
            return Err(FlowError::PastDate(date));
        }

        let busy = self.availability.busy_intervals(date, self.timezone).await;
        debug!("{} busy intervals on {}", busy.len(), date);

        let mut state = self.state();
        state.busy = busy;
        state.date = Some(date);
        state.time = None;
        state.confirmation = None;
        state.slots = self.slots_for(date, &state, now);
        state.step = Step::SelectTime;
        Ok(state.slots.clone())
    }

    /// Choose one of the generated slots.
    pub fn select_time(&self, start: DateTime<Utc>) -> Result<(), FlowError> {
        let mut state = self.state();
        if !matches!(state.step, Step::SelectTime | Step::Form) {
            return Err(FlowError::WrongStep {
                expected: Step::SelectTime.name(),
                actual: state.step.name(),
            });
        }
        if !state.slots.iter().any(|s| s.start == start) {
            return Err(FlowError::SlotUnavailable(start));
        }
        state.time = Some(start);
        state.step = Step::Form;
        Ok(())
    }

    /// Jump straight to the form for a suggested time, if it is still free.
    pub async fn select_suggestion(
        &self,
        suggestion: &SuggestedSlot,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        let start = suggestion.start_in(self.timezone);
        self.select_date(local_date(start, self.timezone), now).await?;
        self.select_time(start)
    }

    /// Return from the form to the time list.
    pub fn back(&self) {
        let mut state = self.state();
        if state.step == Step::Form {
            state.step = Step::SelectTime;
        }
    }

    /// Submit the booking for the selected time.
    ///
    /// Only one submission may be in flight; a concurrent call gets
    /// `FlowError::SubmissionPending`. A failed booking keeps the flow on the
    /// form so the visitor can retry; the response carries the message. The
    /// flow only moves to `Confirmed` if it still shows the submitted time.
    pub async fn submit(&self, attendee: AttendeeDetails) -> Result<BookingResponse, FlowError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FlowError::SubmissionPending);
        }
        let _guard = PendingGuard(&self.submitting);

        let request = {
            let state = self.state();
            match (state.step, state.time) {
                (Step::Form, Some(start)) => {
                    BookingRequest::new(attendee, start, state.meeting_type)
                }
                (step, _) => {
                    return Err(FlowError::WrongStep {
                        expected: Step::Form.name(),
                        actual: step.name(),
                    })
                }
            }
        };

        let response = self.booking.book(&request).await;

        if response.success {
            info!("Booking confirmed for {}", request.start);
            let mut state = self.state();
            // The visitor may have reset or picked another date while the booking was pending.
            if state.step == Step::Form && state.time == Some(request.start) {
                state.step = Step::Confirmed;
                state.confirmation = Some(response.clone());
            } else {
                debug!("Flow moved on during submission, leaving step {}", state.step.name());
            }
        }
        Ok(response)
    }

    /// Start over from date selection, keeping the meeting type.
    pub fn reset(&self) {
        let mut state = self.state();
        let meeting_type = state.meeting_type;
        *state = FlowState {
            meeting_type,
            ..FlowState::default()
        };
    }
}
