//! ClaudeAdvisoryAgent - advisory decisions from the Claude Messages API.
//!
//! Renders the session as a prompt, asks the model for a JSON verdict and
//! parses it leniently. Configuration comes from environment variables.

use crate::prompt::{ADVISORY_SYSTEM_PROMPT, render_advisory_prompt};
use async_trait::async_trait;
use decoy_core::{AdvisoryRequest, AdvisoryResponse, AdvisoryService, DecoyError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Advisory agent that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeAdvisoryAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    timeout: Duration,
}

impl ClaudeAdvisoryAgent {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
            max_tokens: 512,
            timeout: Duration::from_secs(5),
        }
    }

    /// Reads `ANTHROPIC_API_KEY` and, optionally, `DECOY_ADVISORY_MODEL`.
    ///
    /// Model name defaults to `claude-sonnet-4-20250514` if not specified.
    pub fn try_from_env() -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| DecoyError::config("ANTHROPIC_API_KEY not found in environment"))?;
        let model =
            env::var("DECOY_ADVISORY_MODEL").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the agent at a different Messages API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &AdvisoryRequest) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock::text(render_advisory_prompt(request))],
            }],
            max_tokens: self.max_tokens,
            system: Some(ADVISORY_SYSTEM_PROMPT.to_string()),
        }
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| DecoyError::advisory(format!("Claude API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            DecoyError::advisory(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AdvisoryService for ClaudeAdvisoryAgent {
    fn name(&self) -> &str {
        "claude"
    }

    async fn recommend(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse> {
        let body = self.build_request(request);
        let text = self.send_request(&body).await?;
        tracing::debug!(
            "[ClaudeAdvisory] session {}: {}",
            request.session_id,
            text.chars().take(160).collect::<String>()
        );
        AdvisoryResponse::parse_lenient(&text)
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
struct ContentBlock {
    r#type: &'static str,
    text: String,
}

impl ContentBlock {
    fn text(text: String) -> Self {
        Self { r#type: "text", text }
    }
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .ok_or_else(|| DecoyError::advisory("Claude API returned no text in the response content"))
}

fn map_http_error(status: StatusCode, body: String) -> DecoyError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    DecoyError::advisory(format!("Claude API returned {}: {}", status.as_u16(), message))
}
