//! Model backends resolved from the environment.
//!
//! Gemini is the primary generator and the only embedding backend. Groq is
//! used as the quota fallback when `GROQ_API_KEY` is set, or alone when no
//! Gemini key is configured.

use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{info, warn};

use promptlab_model::{
    FallbackGenerator, GeminiClient, GeminiConfig, GroqClient, GroqConfig, ModelError, TextGenerator,
};
use promptlab_rag::{EmbeddingProvider, GeminiEmbeddingProvider};

/// The generator and optional embedder used by `ask`.
pub struct Backends {
    pub generator: Arc<dyn TextGenerator>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl Backends {
    /// Build backends from environment variables.
    ///
    /// With `embeddings` unset, or without a Gemini key, no embedder is
    /// returned and retrieval ranks fragments by keyword overlap.
    pub fn from_env(embeddings: bool) -> Result<Self> {
        let gemini = optional(GeminiConfig::from_env())?.map(GeminiClient::new).transpose()?.map(Arc::new);
        let groq: Option<Arc<dyn TextGenerator>> = match optional(GroqConfig::from_env())? {
            Some(config) => Some(Arc::new(GroqClient::new(config)?)),
            None => None,
        };

        let generator: Arc<dyn TextGenerator> = match (&gemini, groq) {
            (Some(gemini), groq) => {
                let mut generator = FallbackGenerator::new(gemini.clone());
                if let Some(groq) = groq {
                    generator = generator.with_fallback(groq);
                }
                info!(fallback = generator.has_fallback(), "using Gemini for generation");
                Arc::new(generator)
            }
            (None, Some(groq)) => {
                info!("no Gemini key configured, using Groq for generation");
                groq
            }
            (None, None) => bail!(
                "no generation backend configured; set GEMINI_API_KEY (or GOOGLE_API_KEY) or GROQ_API_KEY"
            ),
        };

        let embedder: Option<Arc<dyn EmbeddingProvider>> = match (embeddings, gemini) {
            (true, Some(client)) => Some(Arc::new(GeminiEmbeddingProvider::from_client(client))),
            (true, None) => {
                warn!("embeddings need a Gemini key; ranking fragments by keyword overlap");
                None
            }
            (false, _) => None,
        };

        Ok(Self { generator, embedder })
    }
}

/// A Gemini embedding provider, failing when no key is configured.
pub fn gemini_embedder() -> Result<Arc<dyn EmbeddingProvider>> {
    let client = GeminiClient::new(GeminiConfig::from_env()?)?;
    Ok(Arc::new(GeminiEmbeddingProvider::from_client(Arc::new(client))))
}

/// Treat a missing API key as "not configured" and keep every other error.
fn optional<T>(result: promptlab_model::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ModelError::MissingApiKey { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
