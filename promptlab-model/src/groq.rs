//! Groq client using the OpenAI-compatible chat completions API.
//!
//! This module is only available when the `groq` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::generator::{GenerationRequest, TextGenerator};

const PROVIDER: &str = "Groq";

/// The default Groq API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// The default Groq chat model.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Connection settings for [`GroqClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroqConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Chat model id.
    pub model: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
}

impl GroqConfig {
    /// Create a config with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), model: DEFAULT_MODEL.into(), base_url: GROQ_API_BASE.into() }
    }

    /// Build a config from `GROQ_API_KEY` and the optional `GROQ_MODEL_NAME`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ModelError::MissingApiKey {
                provider: PROVIDER.into(),
                variables: "GROQ_API_KEY".into(),
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GROQ_MODEL_NAME") {
            config.model = model;
        }
        Ok(config)
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Chat completions client for Groq.
pub struct GroqClient {
    http: reqwest::Client,
    config: GroqConfig,
}

impl GroqClient {
    /// Create a client from a config.
    pub fn new(config: GroqConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey {
                provider: PROVIDER.into(),
                variables: "GROQ_API_KEY".into(),
            });
        }
        Ok(Self { http: reqwest::Client::new(), config })
    }
}

// ── Chat completions request/response types ────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(model: &'a str, request: &'a GenerationRequest) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: &request.prompt });
        Self { model, messages, temperature: request.temperature }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Option<String> {
        let content = self.choices.into_iter().next()?.message.content?;
        let content = content.trim();
        (!content.is_empty()).then(|| content.to_string())
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl TextGenerator for GroqClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, prompt_len = request.prompt.len(), "chat completion");

        let body = ChatCompletionRequest::new(&self.config.model, request);
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                ModelError::Request { provider: PROVIDER.into(), message: e.to_string() }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(ModelError::Api { provider: PROVIDER.into(), status: status.as_u16(), message });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            ModelError::Request { provider: PROVIDER.into(), message: format!("failed to parse response: {e}") }
        })?;

        completion.into_text().ok_or_else(|| ModelError::EmptyResponse { provider: PROVIDER.into() })
    }
}
