//! WASM bindings for meetslot-engine.
//!
//! Lets the booking widget compute slots in the browser after it has fetched
//! the host's busy intervals. All complex types are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p meetslot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/meetslot-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/meetslot_engine_wasm.wasm
//! ```
//!
//! The JSON-level functions (`*_json`) hold all the logic and return
//! `Result<String, String>`, so they can be exercised natively; the
//! `#[wasm_bindgen]` exports only convert the error into a `JsValue`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use meetslot_engine::window::{parse_clock, parse_timezone, resolve_local};
use meetslot_engine::{
    find_conflicts, free_windows, generate_slots, BusyInterval, CandidateSlot,
    GenerationRequest, WorkingHours, DEFAULT_STEP_MINUTES,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// Input format for a busy interval passed from JavaScript.
#[derive(Deserialize)]
struct BusyInput {
    start: String,
    end: String,
}

/// Slot request passed from JavaScript.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotRequestInput {
    /// `YYYY-MM-DD`
    date: String,
    #[serde(default)]
    busy: Vec<BusyInput>,
    duration_minutes: u32,
    #[serde(default = "default_step")]
    step_minutes: u32,
    /// Evaluation instant; the widget passes `new Date().toISOString()`.
    now: String,
    /// Opening time, `HH:MM`.
    open: Option<String>,
    /// Closing time, `HH:MM`.
    close: Option<String>,
    /// IANA timezone of the day being queried; UTC when omitted.
    timezone: Option<String>,
}

fn default_step() -> u32 {
    DEFAULT_STEP_MINUTES
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotDto {
    start: String,
    end: String,
}

impl From<&CandidateSlot> for SlotDto {
    fn from(s: &CandidateSlot) -> Self {
        Self {
            start: s.start.to_rfc3339(),
            end: s.end.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeWindowDto {
    start: String,
    end: String,
    duration_minutes: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictDto {
    start: String,
    end: String,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset, e.g. "2026-03-16T12:00:00.000Z") and naive
/// local time (e.g. "2026-03-16T12:00:00"), which is read in `tz`.
fn parse_datetime(s: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map(|ndt| resolve_local(tz, ndt))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_busy(inputs: &[BusyInput], tz: Tz) -> Result<Vec<BusyInterval>, String> {
    inputs
        .iter()
        .map(|input| {
            let start = parse_datetime(&input.start, tz)?;
            let end = parse_datetime(&input.end, tz)?;
            BusyInterval::new(start, end).map_err(|e| e.to_string())
        })
        .collect()
}

fn parse_request(json: &str) -> Result<GenerationRequest, String> {
    let input: SlotRequestInput =
        serde_json::from_str(json).map_err(|e| format!("Invalid request JSON: {}", e))?;

    let tz = match input.timezone.as_deref() {
        Some(name) => parse_timezone(name).map_err(|e| e.to_string())?,
        None => Tz::UTC,
    };
    let date = NaiveDate::parse_from_str(&input.date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", input.date, e))?;
    let now = parse_datetime(&input.now, tz)?;
    let busy = parse_busy(&input.busy, tz)?;

    let defaults = WorkingHours::default();
    let hours = match (input.open.as_deref(), input.close.as_deref()) {
        (None, None) => defaults,
        (open, close) => {
            let open = open.map_or(Ok(defaults.open), parse_clock);
            let close = close.map_or(Ok(defaults.close), parse_clock);
            WorkingHours::new(
                open.map_err(|e| e.to_string())?,
                close.map_err(|e| e.to_string())?,
            )
            .map_err(|e| e.to_string())?
        }
    };

    let request = GenerationRequest::new(date, input.duration_minutes, now)
        .with_step(input.step_minutes)
        .with_hours(hours)
        .with_timezone(tz)
        .with_busy(busy);
    request.validate().map_err(|e| e.to_string())?;
    Ok(request)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// JSON-level API
// ---------------------------------------------------------------------------

/// Generate bookable slots. Returns a JSON array of `{start, end}`.
pub fn generate_slots_json(request_json: &str) -> Result<String, String> {
    let request = parse_request(request_json)?;
    let dtos: Vec<SlotDto> = generate_slots(&request).iter().map(SlotDto::from).collect();
    to_json(&dtos)
}

/// Free windows of the requested day. Returns a JSON array of
/// `{start, end, durationMinutes}`.
pub fn free_windows_json(request_json: &str) -> Result<String, String> {
    let request = parse_request(request_json)?;
    let dtos: Vec<FreeWindowDto> = free_windows(&request)
        .into_iter()
        .map(|w| FreeWindowDto {
            start: w.start.to_rfc3339(),
            end: w.end.to_rfc3339(),
            duration_minutes: w.duration_minutes,
        })
        .collect();
    to_json(&dtos)
}

/// Busy intervals that a meeting at `start` lasting `duration_minutes` would hit.
pub fn find_conflicts_json(
    start: &str,
    duration_minutes: u32,
    busy_json: &str,
) -> Result<String, String> {
    let inputs: Vec<BusyInput> =
        serde_json::from_str(busy_json).map_err(|e| format!("Invalid busy JSON: {}", e))?;
    let busy = parse_busy(&inputs, Tz::UTC)?;
    let slot = CandidateSlot::new(parse_datetime(start, Tz::UTC)?, duration_minutes);

    let dtos: Vec<ConflictDto> = find_conflicts(&slot, &busy)
        .iter()
        .map(|c| ConflictDto {
            start: c.busy.start.to_rfc3339(),
            end: c.busy.end.to_rfc3339(),
            overlap_minutes: c.overlap_minutes,
        })
        .collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Generate bookable slots for one day.
///
/// `request_json` is an object `{date, busy, durationMinutes, stepMinutes?,
/// now, open?, close?, timezone?}`. Returns a JSON string containing an array
/// of `{start, end}` RFC 3339 strings.
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots_js(request_json: &str) -> Result<String, JsValue> {
    generate_slots_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Free windows of one day; same request shape as `generateSlots`.
#[wasm_bindgen(js_name = "findFreeWindows")]
pub fn free_windows_js(request_json: &str) -> Result<String, JsValue> {
    free_windows_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Check a proposed meeting against a JSON array of `{start, end}` busy intervals.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts_js(
    start: &str,
    duration_minutes: u32,
    busy_json: &str,
) -> Result<String, JsValue> {
    find_conflicts_json(start, duration_minutes, busy_json).map_err(|e| JsValue::from_str(&e))
}
