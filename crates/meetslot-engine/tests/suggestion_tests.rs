//! Tests for the smart-suggestion request/response model.

use chrono::{NaiveDate, TimeZone, Utc};
use meetslot_engine::suggestion::{
    parse_suggestions, BreakPeriod, SuggestedSlot, SuggestionRequest,
};
use meetslot_engine::SlotError;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn default_request() -> SuggestionRequest {
    SuggestionRequest::for_next_days(today(), "America/New_York", "Europe/London", 30, 3)
}

#[test]
fn default_request_covers_the_next_three_days_with_lunch_break() {
    let req = default_request();

    assert_eq!(
        req.available_days,
        vec![
            NaiveDate::from_ymd_opt(2026, 3, 17).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 19).unwrap(),
        ]
    );
    assert_eq!(req.common_breaks, vec![BreakPeriod::lunch()]);
    assert!(req.validate().is_ok());
}

#[test]
fn request_serializes_with_camel_case_fields() {
    let json = serde_json::to_value(default_request()).unwrap();

    assert_eq!(json["userTimeZone"], "America/New_York");
    assert_eq!(json["hostTimeZone"], "Europe/London");
    assert_eq!(json["typicalMeetingDuration"], 30);
    assert_eq!(json["availableDays"][0], "2026-03-17");
    assert_eq!(json["commonBreaks"][0]["start"], "12:00");
}

#[test]
fn validation_rejects_bad_inputs() {
    let mut req = default_request();
    req.user_time_zone = "Nowhere/Special".to_string();
    assert!(matches!(req.validate(), Err(SlotError::InvalidTimezone(_))));

    let mut req = default_request();
    req.typical_meeting_duration = 10;
    assert!(matches!(req.validate(), Err(SlotError::InvalidDuration(_))));

    let mut req = default_request();
    req.common_breaks = vec![BreakPeriod::new("13:00", "12:00")];
    assert!(matches!(req.validate(), Err(SlotError::InvalidBreak(_))));
}

#[test]
fn parses_plain_json_array() {
    let text = r#"[{"start":"2026-03-17T10:00:00","end":"2026-03-17T10:30:00"},
                   {"start":"2026-03-18T15:00:00","end":"2026-03-18T15:30:00"}]"#;

    let slots = parse_suggestions(text).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].duration_minutes(), 30);
    assert_eq!(
        slots[1].start,
        NaiveDate::from_ymd_opt(2026, 3, 18)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    );
}

#[test]
fn parses_fenced_output_with_surrounding_prose() {
    let text = "```json\n[{\"start\":\"2026-03-17T09:00\",\"end\":\"2026-03-17T09:30:00Z\"}]\n```";

    let slots = parse_suggestions(text).unwrap();

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].duration_minutes(), 30);

    let prose = "Here you go: [] Let me know!";
    assert!(parse_suggestions(prose).unwrap().is_empty());
}

#[test]
fn malformed_output_is_an_error() {
    assert!(matches!(
        parse_suggestions("I could not find any times."),
        Err(SlotError::SuggestionParse(_))
    ));
    assert!(parse_suggestions(r#"[{"start":"tomorrow","end":"later"}]"#).is_err());
}

#[test]
fn slots_serialize_in_fixed_format() {
    let slot = SuggestedSlot {
        start: NaiveDate::from_ymd_opt(2026, 3, 17).unwrap().and_hms_opt(10, 0, 0).unwrap(),
        end: NaiveDate::from_ymd_opt(2026, 3, 17).unwrap().and_hms_opt(10, 30, 0).unwrap(),
    };

    let json = serde_json::to_string(&slot).unwrap();

    assert_eq!(json, r#"{"start":"2026-03-17T10:00:00","end":"2026-03-17T10:30:00"}"#);
}

#[test]
fn retain_valid_drops_inverted_and_out_of_range_suggestions() {
    let text = r#"[
        {"start":"2026-03-17T10:00:00","end":"2026-03-17T10:30:00"},
        {"start":"2026-03-17T11:00:00","end":"2026-03-17T10:30:00"},
        {"start":"2026-03-25T10:00:00","end":"2026-03-25T10:30:00"}
    ]"#;

    let kept = default_request().retain_valid(parse_suggestions(text).unwrap());

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].start.date(), NaiveDate::from_ymd_opt(2026, 3, 17).unwrap());
}

#[test]
fn suggested_start_resolves_in_host_timezone() {
    let slot = parse_suggestions(r#"[{"start":"2026-03-17T10:00:00","end":"2026-03-17T10:30:00"}]"#)
        .unwrap()[0];

    assert_eq!(
        slot.start_in(chrono_tz::Europe::London),
        Utc.with_ymd_and_hms(2026, 3, 17, 10, 0, 0).unwrap()
    );
    assert_eq!(
        slot.start_in(chrono_tz::America::New_York),
        Utc.with_ymd_and_hms(2026, 3, 17, 14, 0, 0).unwrap()
    );
}
