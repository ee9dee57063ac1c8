//! Tests for the language-model suggestion client against a mock server.

use chrono::NaiveDate;
use meetslot_client::{ClientError, LlmConfig, LlmSuggestions, SuggestionSource};
use meetslot_engine::SuggestionRequest;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> SuggestionRequest {
    SuggestionRequest::for_next_days(
        NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
        "America/New_York",
        "Europe/Madrid",
        30,
        3,
    )
}

fn client(server: &MockServer, api_key: &str) -> LlmSuggestions {
    let config = LlmConfig {
        base_url: format!("{}/v1/", server.uri()),
        api_key: api_key.to_string(),
        model: "test-model".to_string(),
    };
    LlmSuggestions::new(reqwest::Client::new(), &config)
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn returns_parsed_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "```json\n[{\"start\":\"2026-03-17T15:00:00\",\"end\":\"2026-03-17T15:30:00\"},\
             {\"start\":\"2026-03-18T16:00:00\",\"end\":\"2026-03-18T16:30:00\"}]\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = client(&server, "sk-test").suggest(&request()).await;

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].duration_minutes(), 30);
    assert_eq!(
        suggestions[1].start.date(),
        NaiveDate::from_ymd_opt(2026, 3, 18).unwrap()
    );

    let received = server.received_requests().await.unwrap();
    let body: Value = received[0].body_json().unwrap();
    assert_eq!(body["model"], "test-model");
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("Visitor's time zone: America/New_York"));
    assert!(prompt.contains("Available days: 2026-03-17, 2026-03-18, 2026-03-19"));
}

#[tokio::test]
async fn suggestions_outside_available_days_are_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "[{\"start\":\"2026-03-16T15:00:00\",\"end\":\"2026-03-16T15:30:00\"},\
              {\"start\":\"2026-03-19T10:00:00\",\"end\":\"2026-03-19T10:30:00\"}]",
        )))
        .mount(&server)
        .await;

    let suggestions = client(&server, "").suggest(&request()).await;

    assert_eq!(suggestions.len(), 1);
    assert_eq!(
        suggestions[0].start.date(),
        NaiveDate::from_ymd_opt(2026, 3, 19).unwrap()
    );
}

#[tokio::test]
async fn no_authorization_header_without_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[]")))
        .mount(&server)
        .await;

    client(&server, "").suggest(&request()).await;

    let received = server.received_requests().await.unwrap();
    assert!(!received[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn malformed_model_output_yields_no_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Sure! How about Tuesday afternoon?")),
        )
        .mount(&server)
        .await;

    let llm = client(&server, "");

    assert!(llm.suggest(&request()).await.is_empty());
    assert!(matches!(
        llm.fetch_suggestions(&request()).await,
        Err(ClientError::Slot(_))
    ));
}

#[tokio::test]
async fn service_error_yields_no_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    assert!(client(&server, "").suggest(&request()).await.is_empty());
}

#[tokio::test]
async fn invalid_request_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("[]")))
        .expect(0)
        .mount(&server)
        .await;

    let mut bad = request();
    bad.user_time_zone = "Mars/Olympus_Mons".to_string();

    assert!(client(&server, "").suggest(&bad).await.is_empty());
}
