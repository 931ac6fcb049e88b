//! Google Gemini REST client for text generation and embeddings.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::generator::{GenerationRequest, TextGenerator};

const PROVIDER: &str = "Gemini";

/// The default Generative Language API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// The default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";

/// Environment variables consulted for the API key, in priority order.
pub const API_KEY_VARIABLES: [&str; 4] =
    ["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_AI_API_KEY", "GOOGLE_GENERATIVE_AI_API_KEY"];

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model used for `generateContent`.
    pub model: String,
    /// Model used for `embedContent` and `batchEmbedContents`.
    pub embedding_model: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
}

impl GeminiConfig {
    /// Create a config with the default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            base_url: GEMINI_API_BASE.into(),
        }
    }

    /// Build a config from the environment.
    ///
    /// The key comes from the first set variable in [`API_KEY_VARIABLES`];
    /// `GEMINI_MODEL_NAME` and `GEMINI_EMBED_MODEL` override the models.
    pub fn from_env() -> Result<Self> {
        let api_key = API_KEY_VARIABLES
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| ModelError::MissingApiKey {
                provider: PROVIDER.into(),
                variables: API_KEY_VARIABLES.join(", "),
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL_NAME") {
            config.model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_EMBED_MODEL") {
            config.embedding_model = model;
        }
        Ok(config)
    }

    /// Set the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Point the client at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Client for the Gemini `generateContent` and embedding endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use promptlab_model::{GeminiClient, GeminiConfig};
///
/// let client = GeminiClient::new(GeminiConfig::new("your-api-key"))?;
/// let vector = client.embed("hello world").await?;
/// ```
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client from a config.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey {
                provider: PROVIDER.into(),
                variables: API_KEY_VARIABLES.join(", "),
            });
        }
        Ok(Self { http: reqwest::Client::new(), config })
    }

    /// Return the client configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Embed a single text with the configured embedding model.
    ///
    /// Newlines are replaced by spaces before the request is sent.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, model = %self.config.embedding_model, text_len = text.len(), "embedding text");

        let model = model_path(&self.config.embedding_model);
        let body = EmbedContentRequest { model: model.clone(), content: Content::text(&flatten(text)) };
        let url = format!("{}/{model}:embedContent", self.config.base_url);
        let response: EmbedContentResponse = self.post(&url, &body).await?;

        if response.embedding.values.is_empty() {
            return Err(ModelError::EmptyResponse { provider: PROVIDER.into() });
        }
        Ok(response.embedding.values)
    }

    /// Embed several texts in one `batchEmbedContents` call.
    ///
    /// The returned vectors follow the input order.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = PROVIDER, model = %self.config.embedding_model, batch_size = texts.len(), "embedding batch");

        let model = model_path(&self.config.embedding_model);
        let body = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model.clone(),
                    content: Content::text(&flatten(text)),
                })
                .collect(),
        };
        let url = format!("{}/{model}:batchEmbedContents", self.config.base_url);
        let response: BatchEmbedContentsResponse = self.post(&url, &body).await?;

        if response.embeddings.len() != texts.len() {
            return Err(ModelError::Request {
                provider: PROVIDER.into(),
                message: format!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            });
        }
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                ModelError::Request { provider: PROVIDER.into(), message: e.to_string() }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| match e.error.status {
                    Some(code) => format!("{code}: {}", e.error.message),
                    None => e.error.message,
                })
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(ModelError::Api { provider: PROVIDER.into(), status: status.as_u16(), message });
        }

        response.json::<R>().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            ModelError::Request {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, prompt_len = request.prompt.len(), "generating content");

        let model = model_path(&self.config.model);
        let body = GenerateContentRequest::from_request(request);
        let url = format!("{}/{model}:generateContent", self.config.base_url);
        let response: GenerateContentResponse = self.post(&url, &body).await?;

        response.text().ok_or_else(|| ModelError::EmptyResponse { provider: PROVIDER.into() })
    }
}

/// Normalize a model id to the `models/{id}` resource path.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") { model.to_string() } else { format!("models/{model}") }
}

fn flatten(text: &str) -> String {
    text.replace('\n', " ")
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self { role: None, parts: vec![Part { text: Some(text.to_string()) }] }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn from_request(request: &GenerationRequest) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            parts.push(Part { text: Some(system.clone()) });
        }
        parts.push(Part { text: Some(request.prompt.clone()) });

        Self {
            contents: vec![Content { role: Some("user".into()), parts }],
            generation_config: request.temperature.map(|temperature| GenerationConfig { temperature }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate that has any, trimmed.
    fn text(&self) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            let content = candidate.content.as_ref()?;
            let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
    }
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Serialize)]
struct BatchEmbedContentsRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}
