//! Availability lookup against the host's calendar webhook.
//!
//! `GET {url}?start=<ISO>&end=<ISO>` for the local day's bounds returns a JSON
//! array of `{"inicio": ISO, "fin": ISO}` busy intervals. Lookups fail open:
//! any error is logged and the day is treated as having no known busy time.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use meetslot_engine::window::{local_day_bounds, resolve_local};
use meetslot_engine::BusyInterval;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Source of a host's busy intervals for one day.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Busy intervals of `date` in `tz`. Never fails; errors yield an empty set.
    async fn busy_intervals(&self, date: NaiveDate, tz: Tz) -> Vec<BusyInterval>;
}

/// Wire shape of one busy entry.
#[derive(Debug, Deserialize)]
struct BusyEntry {
    #[serde(rename = "inicio")]
    start: Value,
    #[serde(rename = "fin")]
    end: Value,
}

/// HTTP implementation backed by the availability webhook.
#[derive(Clone)]
pub struct HttpAvailability {
    client: Client,
    url: String,
}

impl HttpAvailability {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Query bounds for `date`: local 00:00:00.000 through 23:59:59.999, in UTC.
    pub fn query_bounds(date: NaiveDate, tz: Tz) -> (String, String) {
        let (start, next_midnight) = local_day_bounds(date, tz);
        let end = next_midnight - Duration::milliseconds(1);
        (
            start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    /// Fallible lookup, for callers that want to see the error.
    pub async fn fetch_busy_intervals(&self, date: NaiveDate, tz: Tz) -> Result<Vec<BusyInterval>> {
        let (start, end) = Self::query_bounds(date, tz);
        debug!("Fetching availability from {} for {} .. {}", self.url, start, end);

        let response = self
            .client
            .get(&self.url)
            .query(&[("start", start.as_str()), ("end", end.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let intervals = parse_busy_response(body, tz)?;
        info!("Fetched {} busy intervals for {}", intervals.len(), date);
        Ok(intervals)
    }
}

#[async_trait]
impl AvailabilitySource for HttpAvailability {
    async fn busy_intervals(&self, date: NaiveDate, tz: Tz) -> Vec<BusyInterval> {
        match self.fetch_busy_intervals(date, tz).await {
            Ok(intervals) => intervals,
            Err(e) => {
                warn!("Availability lookup failed, treating {} as open: {}", date, e);
                Vec::new()
            }
        }
    }
}

/// Fixed busy set, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAvailability {
    pub busy: Vec<BusyInterval>,
}

#[async_trait]
impl AvailabilitySource for StaticAvailability {
    async fn busy_intervals(&self, _date: NaiveDate, _tz: Tz) -> Vec<BusyInterval> {
        self.busy.clone()
    }
}

/// Parse the webhook body. Non-array bodies are an error; individual
/// malformed entries are skipped with a warning.
pub fn parse_busy_response(body: Value, tz: Tz) -> Result<Vec<BusyInterval>> {
    let Value::Array(entries) = body else {
        return Err(ClientError::Parse(
            "availability response is not a JSON array".to_string(),
        ));
    };

    let mut intervals = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_entry(entry, tz) {
            Ok(interval) => intervals.push(interval),
            Err(e) => warn!("Skipping busy entry: {}", e),
        }
    }
    Ok(intervals)
}

fn parse_entry(entry: Value, tz: Tz) -> Result<BusyInterval> {
    let entry: BusyEntry = serde_json::from_value(entry)?;
    let start = parse_instant(&entry.start, tz)?;
    let end = parse_instant(&entry.end, tz)?;
    Ok(BusyInterval::new(start, end)?)
}

/// Accept RFC 3339 strings, naive ISO strings (read in `tz`), and epoch milliseconds.
fn parse_instant(value: &Value, tz: Tz) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
                .map(|ndt| resolve_local(tz, ndt))
                .map_err(|_| ClientError::Parse(format!("invalid datetime '{}'", s)))
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| ClientError::Parse(format!("invalid timestamp {}", n))),
        other => Err(ClientError::Parse(format!("invalid datetime {}", other))),
    }
}
