//! Tests for the availability webhook client against a mock server.

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use meetslot_client::{AvailabilitySource, ClientError, HttpAvailability};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn client(server: &MockServer) -> HttpAvailability {
    HttpAvailability::new(
        reqwest::Client::new(),
        format!("{}/webhook/availability", server.uri()),
    )
}

#[tokio::test]
async fn fetches_busy_intervals_for_the_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/webhook/availability"))
        .and(query_param("start", "2026-03-16T00:00:00.000Z"))
        .and(query_param("end", "2026-03-16T23:59:59.999Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"inicio": "2026-03-16T12:00:00.000Z", "fin": "2026-03-16T13:00:00.000Z"},
            {"inicio": "2026-03-16T15:30:00.000Z", "fin": "2026-03-16T16:00:00.000Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let busy = client(&server).busy_intervals(date(), Tz::UTC).await;

    assert_eq!(busy.len(), 2);
    assert_eq!(busy[0].start, Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap());
    assert_eq!(busy[1].end, Utc.with_ymd_and_hms(2026, 3, 16, 16, 0, 0).unwrap());
}

#[tokio::test]
async fn server_error_fails_open_to_no_busy_intervals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let availability = client(&server);

    assert!(availability.busy_intervals(date(), Tz::UTC).await.is_empty());
    assert!(matches!(
        availability.fetch_busy_intervals(date(), Tz::UTC).await,
        Err(ClientError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn non_array_body_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    assert!(client(&server).busy_intervals(date(), Tz::UTC).await.is_empty());
}

#[tokio::test]
async fn invalid_json_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    assert!(client(&server).busy_intervals(date(), Tz::UTC).await.is_empty());
}

#[tokio::test]
async fn unreachable_service_fails_open() {
    // Nothing listens on port 9 (discard) in the test environment.
    let availability = HttpAvailability::new(reqwest::Client::new(), "http://127.0.0.1:9/none");

    assert!(availability.busy_intervals(date(), Tz::UTC).await.is_empty());
}

#[tokio::test]
async fn query_uses_the_local_day_of_the_host_timezone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("start", "2026-03-16T04:00:00.000Z"))
        .and(query_param("end", "2026-03-17T03:59:59.999Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let busy = client(&server)
        .busy_intervals(date(), chrono_tz::America::New_York)
        .await;

    assert!(busy.is_empty());
}
