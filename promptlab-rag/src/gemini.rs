//! Gemini embedding provider using the `promptlab-model` client.
//!
//! This module is only available when the `gemini` feature is enabled.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use promptlab_model::{GeminiClient, GeminiConfig, ModelError};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Shares its [`GeminiClient`] with the generation side when built with
/// [`GeminiEmbeddingProvider::from_client`].
///
/// # Example
///
/// ```rust,ignore
/// use promptlab_rag::GeminiEmbeddingProvider;
///
/// let provider = GeminiEmbeddingProvider::new("your-api-key")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct GeminiEmbeddingProvider {
    client: Arc<GeminiClient>,
    batched: bool,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider using the given API key and the default
    /// `gemini-embedding-001` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = GeminiClient::new(GeminiConfig::new(api_key)).map_err(to_rag_error)?;
        Ok(Self::from_client(Arc::new(client)))
    }

    /// Create a new provider from an existing client.
    pub fn from_client(client: Arc<GeminiClient>) -> Self {
        Self { client, batched: false }
    }

    /// Embed chunks with one `batchEmbedContents` request instead of one
    /// request per chunk.
    pub fn with_batching(mut self, batched: bool) -> Self {
        self.batched = batched;
        self
    }
}

fn to_rag_error(e: ModelError) -> RagError {
    RagError::Embedding { provider: "Gemini".into(), message: e.to_string() }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn name(&self) -> &str {
        &self.client.config().embedding_model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "embedding request failed");
            to_rag_error(e)
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if !self.batched {
            let mut results = Vec::with_capacity(texts.len());
            for text in texts {
                results.push(self.embed(text).await?);
            }
            return Ok(results);
        }

        self.client.embed_batch(texts).await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "batch embedding request failed");
            to_rag_error(e)
        })
    }
}
