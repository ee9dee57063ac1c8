//! `meetslot` CLI: list bookable slots, book one, or ask for suggested times.
//!
//! ## Usage
//!
//! ```sh
//! # Slots for a day, busy intervals from a file
//! meetslot slots --date 2026-03-16 -i busy.json
//!
//! # Busy intervals from stdin, 60-minute meetings, as JSON
//! cat busy.json | meetslot slots --date 2026-03-16 --duration 60 --json
//!
//! # Ask the availability webhook instead, in the host's timezone
//! meetslot slots --date 2026-03-16 --fetch --tz Europe/Madrid
//!
//! # Free windows rather than slots
//! meetslot slots --date 2026-03-16 -i busy.json --free
//!
//! # Book a slot through the booking webhook
//! meetslot book --name Ada --last-name Lovelace --email ada@example.com \
//!   --at 2026-03-16T10:00:00Z
//!
//! # Suggested times for the next three days
//! meetslot suggest --user-tz America/New_York --host-tz Europe/Madrid
//! ```
//!
//! Webhook URLs and the language-model endpoint come from `meetslot.toml`
//! (or `--config`) and `MEETSLOT_*` environment variables; a `.env` file in
//! the working directory is loaded first.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use meetslot_client::{
    AttendeeDetails, AvailabilitySource, BookingRequest, BookingSink, ClientConfig,
    HttpAvailability, HttpBooking, LlmSuggestions, SuggestionSource,
};
use meetslot_engine::window::{parse_clock, parse_timezone, resolve_local};
use meetslot_engine::{
    free_windows, generate_slots, BusyInterval, GenerationRequest, MeetingType, SuggestionRequest,
    WorkingHours,
};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meetslot", version, about = "Meeting slot scheduler CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./meetslot.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log requests and decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookable slots for a day
    Slots {
        /// Day to schedule, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Meeting length: 30 (short) or 60 (work)
        #[arg(long, default_value = "30")]
        duration: MeetingType,
        /// Minutes between candidate starts (defaults to the configured step)
        #[arg(long)]
        step: Option<u32>,
        /// Opening time, HH:MM
        #[arg(long)]
        open: Option<String>,
        /// Closing time, HH:MM
        #[arg(long)]
        close: Option<String>,
        /// IANA timezone of the host (defaults to the configured timezone)
        #[arg(long)]
        tz: Option<String>,
        /// Evaluation instant, RFC 3339 (defaults to the current time)
        #[arg(long)]
        now: Option<String>,
        /// Busy intervals JSON file (reads stdin if omitted and --fetch is not set)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Fetch busy intervals from the availability webhook
        #[arg(long)]
        fetch: bool,
        /// Print free windows instead of slots
        #[arg(long)]
        free: bool,
        /// Print JSON instead of one line per entry
        #[arg(long)]
        json: bool,
    },
    /// Book a meeting through the booking webhook
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        /// Meeting start, RFC 3339 or local YYYY-MM-DDTHH:MM:SS
        #[arg(long)]
        at: String,
        /// Meeting length: 30 (short) or 60 (work)
        #[arg(long, default_value = "30")]
        duration: MeetingType,
        #[arg(long)]
        notes: Option<String>,
        /// IANA timezone of the host (defaults to the configured timezone)
        #[arg(long)]
        tz: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Ask the language model for suggested meeting times
    Suggest {
        /// Visitor's IANA timezone
        #[arg(long)]
        user_tz: String,
        /// Host's IANA timezone
        #[arg(long)]
        host_tz: String,
        /// Typical meeting duration in minutes
        #[arg(long, default_value_t = 30)]
        duration: u32,
        /// Number of days after today to consider
        #[arg(long, default_value_t = 3)]
        days: u32,
        #[arg(long)]
        json: bool,
    },
}

/// Busy entry in an input file. Accepts the webhook's field names too.
#[derive(Deserialize)]
struct BusyInput {
    #[serde(alias = "inicio")]
    start: String,
    #[serde(alias = "fin")]
    end: String,
}

#[derive(Serialize)]
struct SlotOutput {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}


#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Slots {
            date,
            duration,
            step,
            open,
            close,
            tz,
            now,
            input,
            fetch,
            free,
            json,
        } => {
            let tz = resolve_timezone(tz.as_deref(), &config)?;
            let hours = resolve_hours(open.as_deref(), close.as_deref(), &config)?;
            let now = match now {
                Some(s) => parse_instant(&s, tz)?,
                None => Utc::now(),
            };

            let mut busy = Vec::new();
            if input.is_some() || !fetch {
                let raw = read_input(input.as_deref())?;
                busy.extend(parse_busy(&raw, tz)?);
            }
            if fetch {
                let url = ClientConfig::require(&config.availability_url, "availability_url")?;
                let availability = HttpAvailability::new(config.http_client()?, url);
                busy.extend(availability.busy_intervals(date, tz).await);
            }

            debug!(
                "Generating {} slots for {} in {} ({}-{}), {} busy intervals",
                duration,
                date,
                tz,
                hours.open.format("%H:%M"),
                hours.close.format("%H:%M"),
                busy.len()
            );

            let request = GenerationRequest::for_meeting(date, duration, now)
                .with_step(step.unwrap_or(config.step_minutes))
                .with_hours(hours)
                .with_timezone(tz)
                .with_busy(busy);
            request.validate().context("Invalid slot request")?;

            if free {
                let windows = free_windows(&request);
                if json {
                    println!("{}", serde_json::to_string_pretty(&windows)?);
                } else {
                    for w in windows {
                        println!(
                            "{}-{} ({} min)",
                            clock(w.start, tz),
                            clock(w.end, tz),
                            w.duration_minutes
                        );
                    }
                }
            } else {
                let slots = generate_slots(&request);
                if json {
                    let out: Vec<_> = slots
                        .iter()
                        .map(|s| SlotOutput {
                            start: s.start,
                            end: s.end,
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&out)?);
                } else {
                    for s in slots {
                        println!("{}", clock(s.start, tz));
                    }
                }
            }
        }
        Commands::Book {
            name,
            last_name,
            email,
            at,
            duration,
            notes,
            tz,
            json,
        } => {
            let tz = resolve_timezone(tz.as_deref(), &config)?;
            let url = ClientConfig::require(&config.booking_url, "booking_url")?;
            let start = parse_instant(&at, tz)?;

            let request = BookingRequest::new(
                AttendeeDetails {
                    name,
                    last_name,
                    email,
                    notes,
                },
                start,
                duration,
            );
            let booking = HttpBooking::new(config.http_client()?, url, tz);
            let response = booking.book(&request).await;
            info!("Booking outcome: {}", response.message);

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.message);
                if let Some(link) = &response.meeting_link {
                    println!("Meeting link: {}", link);
                }
            }
            if !response.success {
                bail!("Booking failed: {}", response.message);
            }
        }
        Commands::Suggest {
            user_tz,
            host_tz,
            duration,
            days,
            json,
        } => {
            let host = parse_timezone(&host_tz)?;
            let today = Utc::now().with_timezone(&host).date_naive();
            let request = SuggestionRequest::for_next_days(today, user_tz, host_tz, duration, days);
            request.validate().context("Invalid suggestion request")?;

            let llm = LlmSuggestions::new(config.http_client()?, &config.llm);
            let suggestions = llm.suggest(&request).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else if suggestions.is_empty() {
                eprintln!("No suggestions available.");
            } else {
                for s in suggestions {
                    println!(
                        "{} - {}",
                        s.start.format("%Y-%m-%d %H:%M"),
                        s.end.format("%H:%M")
                    );
                }
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `-v`. Logs go to stderr
/// so stdout stays parseable.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_timezone(flag: Option<&str>, config: &ClientConfig) -> Result<Tz> {
    match flag {
        Some(name) => Ok(parse_timezone(name)?),
        None => config.timezone().context("Invalid configured timezone"),
    }
}

fn resolve_hours(
    open: Option<&str>,
    close: Option<&str>,
    config: &ClientConfig,
) -> Result<WorkingHours> {
    let configured = config.working_hours().context("Invalid configured working hours")?;
    let open = open.map(parse_clock).transpose()?.unwrap_or(configured.open);
    let close = close.map(parse_clock).transpose()?.unwrap_or(configured.close);
    Ok(WorkingHours::new(open, close)?)
}

/// RFC 3339, or a naive local date-time read in `tz`.
fn parse_instant(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map(|ndt| resolve_local(tz, ndt))
        .with_context(|| format!("Invalid date-time: '{}'", s))
}

fn parse_busy(raw: &str, tz: Tz) -> Result<Vec<BusyInterval>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<BusyInput> =
        serde_json::from_str(raw).context("Busy input must be a JSON array of {start, end}")?;
    entries
        .iter()
        .map(|e| {
            let start = parse_instant(&e.start, tz)?;
            let end = parse_instant(&e.end, tz)?;
            BusyInterval::new(start, end).context("Invalid busy interval")
        })
        .collect()
}

fn clock(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

fn read_input(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
