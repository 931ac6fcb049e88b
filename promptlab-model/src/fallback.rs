//! Quota-aware provider fallback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{ModelError, Result};
use crate::generator::{GenerationRequest, TextGenerator};

/// Sends each request to a primary backend and, when the primary fails with
/// a quota or rate-limit error, retries it once on a secondary backend.
///
/// Errors that are not quota related are returned unchanged. When both
/// backends fail the result is [`ModelError::Exhausted`].
///
/// # Example
///
/// ```rust,ignore
/// use promptlab_model::{FallbackGenerator, GeminiClient, GroqClient};
///
/// let generator = FallbackGenerator::new(Arc::new(gemini)).with_fallback(Arc::new(groq));
/// ```
pub struct FallbackGenerator {
    primary: Arc<dyn TextGenerator>,
    fallback: Option<Arc<dyn TextGenerator>>,
}

impl FallbackGenerator {
    /// Wrap a primary backend with no fallback configured.
    pub fn new(primary: Arc<dyn TextGenerator>) -> Self {
        Self { primary, fallback: None }
    }

    /// Set the backend used when the primary runs out of quota.
    pub fn with_fallback(mut self, fallback: Arc<dyn TextGenerator>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Whether a fallback backend is configured.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
impl TextGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let primary_err = match self.primary.generate(request).await {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };

        let Some(fallback) = self.fallback.as_ref().filter(|_| primary_err.is_quota()) else {
            return Err(primary_err);
        };

        warn!(
            primary = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_err,
            "primary model out of quota, switching to fallback"
        );

        fallback.generate(request).await.map_err(|fallback_err| ModelError::Exhausted {
            primary: primary_err.to_string(),
            fallback: fallback_err.to_string(),
        })
    }
}
