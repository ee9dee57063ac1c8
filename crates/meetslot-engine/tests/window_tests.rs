//! Tests for working hours, local-time resolution, and DST handling.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use meetslot_engine::window::{
    is_same_local_day, local_day_bounds, parse_clock, parse_timezone, resolve_local,
};
use meetslot_engine::{SlotError, WorkingHours, WorkingWindow};

fn new_york() -> Tz {
    "America/New_York".parse().unwrap()
}

#[test]
fn default_hours_are_nine_to_six() {
    let hours = WorkingHours::default();
    assert_eq!(hours.open, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(hours.close, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
}

#[test]
fn hours_must_open_before_they_close() {
    assert!(matches!(
        WorkingHours::parse("18:00", "09:00"),
        Err(SlotError::InvalidWorkingHours(_))
    ));
    assert!(WorkingHours::parse("09:00", "09:00").is_err());
    assert!(WorkingHours::parse("9am", "18:00").is_err());
    assert!(WorkingHours::parse("08:30", "17:30:00").is_ok());
}

#[test]
fn utc_window_matches_clock_times() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let window = WorkingWindow::for_date(date, &WorkingHours::default(), Tz::UTC);

    assert_eq!(window.day_start, Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap());
    assert_eq!(window.day_end, Utc.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap());
    assert_eq!(window.duration_minutes(), 540);
    assert!(window.contains(window.day_start, window.day_end));
    assert!(!window.contains(
        Utc.with_ymd_and_hms(2026, 3, 16, 17, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 16, 18, 30, 0).unwrap(),
    ));
}

#[test]
fn window_on_spring_forward_day_uses_daylight_offset() {
    // DST starts 2026-03-08 02:00 in New York; working hours are after the jump.
    let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
    let window = WorkingWindow::for_date(date, &WorkingHours::default(), new_york());

    assert_eq!(window.day_start, Utc.with_ymd_and_hms(2026, 3, 8, 13, 0, 0).unwrap());
    assert_eq!(window.day_end, Utc.with_ymd_and_hms(2026, 3, 8, 22, 0, 0).unwrap());
}

#[test]
fn nonexistent_local_time_shifts_forward() {
    // 02:30 does not exist on 2026-03-08 in New York; EST offset applies → 03:30 EDT.
    let local = NaiveDate::from_ymd_opt(2026, 3, 8)
        .unwrap()
        .and_hms_opt(2, 30, 0)
        .unwrap();

    let resolved = resolve_local(new_york(), local);

    assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap());
}

#[test]
fn ambiguous_local_time_resolves_to_earliest() {
    // 01:30 happens twice on 2026-11-01 in New York; the EDT one comes first.
    let local = NaiveDate::from_ymd_opt(2026, 11, 1)
        .unwrap()
        .and_hms_opt(1, 30, 0)
        .unwrap();

    let resolved = resolve_local(new_york(), local);

    assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
}

#[test]
fn local_day_membership() {
    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let late_evening_utc = Utc.with_ymd_and_hms(2026, 3, 17, 1, 0, 0).unwrap();

    assert!(!is_same_local_day(late_evening_utc, date, Tz::UTC));
    assert!(is_same_local_day(late_evening_utc, date, new_york()));

    let (start, end) = local_day_bounds(date, new_york());
    assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 16, 4, 0, 0).unwrap());
    assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 17, 4, 0, 0).unwrap());
}

#[test]
fn timezone_and_clock_parsing() {
    assert_eq!(parse_timezone("Europe/London").unwrap(), chrono_tz::Europe::London);
    assert!(matches!(
        parse_timezone("Mars/Olympus_Mons"),
        Err(SlotError::InvalidTimezone(_))
    ));
    assert_eq!(parse_clock("12:00").unwrap(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    assert!(parse_clock("25:00").is_err());
}
