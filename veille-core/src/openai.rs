//! OpenAI chat-completion client used for report generation.
//!
//! The client makes exactly one request per completion. Upstream failures
//! are surfaced as typed errors and never retried here; the API layer maps
//! them to its own error codes.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Public endpoint; tests point `CompletionConfig::base_url` at a mock.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI rejected the API key: {0}")]
    Auth(String),

    #[error("OpenAI rate limit hit: {0}")]
    RateLimited(String),

    #[error("OpenAI API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Config
// ============================================================================

/// Everything needed to call the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub base_url: String,
}

impl CompletionConfig {
    /// Build from the `[openai]` config section. An explicit key wins,
    /// otherwise `OPENAI_API_KEY` is consulted; the key may end up empty,
    /// which [`OpenAiClient::new`] rejects.
    pub fn new(api_key: Option<String>, openai: &crate::config::OpenAiConfig) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            model: openai.model.clone(),
            max_tokens: openai.max_tokens,
            temperature: openai.temperature,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }
}

// ============================================================================
// OpenAI API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: Option<OpenAiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// OpenAiClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        if config.api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    /// Run one chat completion and return the assistant text. An answer with
    /// no choices or null content comes back as the empty string; deciding
    /// what to do with a blank report is the caller's business.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OpenAiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);
            let message = detail.map(|d| d.message).unwrap_or(error_body);

            tracing::error!(status = status.as_u16(), message = %message, "OpenAI API error");

            return match status.as_u16() {
                401 => Err(CompletionError::Auth(message)),
                429 => Err(CompletionError::RateLimited(message)),
                code => Err(CompletionError::Api { code, message }),
            };
        }

        let chat: ChatResponse = response.json().await?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}

// ============================================================================
// TESTS
// ============================================================================
