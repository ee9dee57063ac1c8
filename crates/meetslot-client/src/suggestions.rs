//! Smart meeting-time suggestions from a language model.
//!
//! Renders the scheduling context into a prompt, sends it to an
//! OpenAI-compatible chat completion endpoint, and parses the reply as a JSON
//! array of `{start, end}` local date-times. Every failure degrades to an
//! empty suggestion list.

use crate::config::LlmConfig;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use meetslot_engine::suggestion::{parse_suggestions, SuggestedSlot, SuggestionRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a scheduling assistant helping a visitor and a host \
find the best meeting times. Reply with JSON only.";

/// Source of suggested meeting times.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Suggestions for `request`. Never fails; errors yield an empty list.
    async fn suggest(&self, request: &SuggestionRequest) -> Vec<SuggestedSlot>;
}

/// Render the user prompt for `request`.
pub fn render_prompt(request: &SuggestionRequest) -> String {
    let breaks = request
        .common_breaks
        .iter()
        .map(|b| format!("{} - {}", b.start, b.end))
        .collect::<Vec<_>>()
        .join(", ");
    let days = request
        .available_days
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Consider the following information:\n\
         - Visitor's time zone: {}\n\
         - Host's time zone: {}\n\
         - Common break times: {}\n\
         - Typical meeting duration: {} minutes\n\
         - Available days: {}\n\
         \n\
         Suggest a list of optimal meeting times that respect both time zones, avoid the \
         break times, last the typical meeting duration, and fall only on the available days.\n\
         Return a JSON array of objects with \"start\" and \"end\" properties, each in the \
         format YYYY-MM-DDTHH:mm:ss.",
        request.user_time_zone,
        request.host_time_zone,
        breaks,
        request.typical_meeting_duration,
        days
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Suggestion service backed by an OpenAI-compatible chat completion API.
#[derive(Clone)]
pub struct LlmSuggestions {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmSuggestions {
    pub fn new(client: Client, config: &LlmConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Fallible request, for callers that want to see the error.
    pub async fn fetch_suggestions(&self, request: &SuggestionRequest) -> Result<Vec<SuggestedSlot>> {
        request.validate()?;
        let prompt = render_prompt(request);
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting suggestions from {}", url);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.2,
        };

        let mut builder = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        let response = builder.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::Parse("empty completion".to_string()))?;

        let suggestions = request.retain_valid(parse_suggestions(&content)?);
        info!("Received {} meeting suggestions", suggestions.len());
        Ok(suggestions)
    }
}

#[async_trait]
impl SuggestionSource for LlmSuggestions {
    async fn suggest(&self, request: &SuggestionRequest) -> Vec<SuggestedSlot> {
        match self.fetch_suggestions(request).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("Suggestion service failed, returning no suggestions: {}", e);
                Vec::new()
            }
        }
    }
}
