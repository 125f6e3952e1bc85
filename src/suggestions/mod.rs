//! AI event-idea suggestions.
//!
//! Recent events are turned into a prompt, sent to a text-completion
//! backend, and the JSON array embedded in the free-text reply is parsed
//! into [`EventSuggestion`]s.

pub mod gemini;

use crate::event::EventContext;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use async_trait::async_trait;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

pub use gemini::GeminiClient;

/// How many past events are quoted in the prompt
pub const RECENT_EVENT_LIMIT: i64 = 4;

pub const NO_EVENTS_PLACEHOLDER: &str = "* No recent events available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSuggestion {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotional_message: Option<String>,
}

#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Database error: {0}")]
    Store(String),

    #[error("Rate limit exceeded. Please check your Gemini API usage limits and try again later.")]
    RateLimited,

    #[error("Invalid Gemini API key. Please check your API key configuration.")]
    InvalidApiKey,

    #[error("Gemini API error: {0}")]
    UpstreamStatus(u16),

    /// Built through [`SuggestionError::transport`], which drops the URL
    #[error("Gemini API request failed: {0}")]
    Transport(reqwest::Error),

    /// The reply arrived but did not contain a usable suggestion array
    #[error("Invalid response format from Gemini API")]
    MalformedReply(String),
}

impl SuggestionError {
    pub fn transport(err: reqwest::Error) -> Self {
        SuggestionError::Transport(err.without_url())
    }
}

impl ResponseError for SuggestionError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Anything that can turn a prompt into generated text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, SuggestionError>;
}

pub fn build_prompt(recent_events: &[EventContext]) -> String {
    let events_context = if recent_events.is_empty() {
        NO_EVENTS_PLACEHOLDER.to_string()
    } else {
        recent_events
            .iter()
            .map(|e| format!("* {}: {}", e.title, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Based on these past community events:

{events_context}

Suggest 3 new creative event ideas for a residential community. For each event, also create a promotional message that managers can copy and share. Return a JSON array with this exact structure:
[
  {{
    "title": "Event Title",
    "description": "Brief description of the event",
    "category": "Category like Technology, Safety, Training, etc.",
    "promotionalMessage": "Ready-to-share promotional text with emojis that managers can copy and paste to promote this event"
  }}
]

Make the suggestions diverse, engaging, and suitable for a residential community. The promotional messages should be catchy and include relevant emojis."#
    )
}

/// Parses the span between the first `[` and the last `]` of `reply`
pub fn extract_suggestions(reply: &str) -> Result<Vec<EventSuggestion>, SuggestionError> {
    let start = reply
        .find('[')
        .ok_or_else(|| SuggestionError::MalformedReply("no JSON array in reply".to_string()))?;
    let end = reply
        .rfind(']')
        .filter(|end| *end > start)
        .ok_or_else(|| SuggestionError::MalformedReply("unterminated JSON array".to_string()))?;

    serde_json::from_str(&reply[start..=end])
        .map_err(|e| SuggestionError::MalformedReply(e.to_string()))
}

/// Prompts the client with `recent_events` and parses what comes back
pub async fn generate_suggestions(
    client: &dyn CompletionClient,
    recent_events: &[EventContext],
) -> Result<Vec<EventSuggestion>, SuggestionError> {
    let prompt = build_prompt(recent_events);
    let reply = client.complete(&prompt).await?;

    match extract_suggestions(&reply) {
        Ok(suggestions) => {
            info!(
                "Generated {} suggestion(s) from {} recent event(s)",
                suggestions.len(),
                recent_events.len()
            );
            Ok(suggestions)
        }
        Err(e) => {
            if let SuggestionError::MalformedReply(reason) = &e {
                error!("Unparsable completion reply ({}): {}", reason, reply);
            }
            Err(e)
        }
    }
}
