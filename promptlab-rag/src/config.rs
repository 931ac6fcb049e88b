//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Chunk size in word tokens.
    pub chunk_size: usize,
    /// Number of tokens shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks placed in the context block.
    pub top_k: usize,
    /// Maximum number of characters of an embedding error shown to users.
    pub diagnostic_limit: usize,
    /// Language the answer should be written in. Unset leaves it to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_language: Option<String>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 220,
            chunk_overlap: 50,
            top_k: 3,
            diagnostic_limit: 200,
            answer_language: None,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Parse a JSON document into a validated config.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RagConfig = serde_json::from_str(json)
            .map_err(|e| RagError::InvalidConfig(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `diagnostic_limit == 0`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::InvalidConfig("top_k must be greater than zero".to_string()));
        }
        if self.diagnostic_limit == 0 {
            return Err(RagError::InvalidConfig("diagnostic_limit must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Start from an existing config instead of the defaults.
    pub fn from_config(config: RagConfig) -> Self {
        Self { config }
    }

    /// Set the chunk size in word tokens.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in word tokens.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks to retrieve.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the maximum length of the diagnostic shown when embeddings fail.
    pub fn diagnostic_limit(mut self, limit: usize) -> Self {
        self.config.diagnostic_limit = limit;
        self
    }

    /// Ask for answers in the given language.
    pub fn answer_language(mut self, language: impl Into<String>) -> Self {
        self.config.answer_language = Some(language.into());
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] when [`RagConfig::validate`] fails.
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.chunk_size, 220);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.diagnostic_limit, 200);
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let err = RagConfig::builder().chunk_size(5).chunk_overlap(5).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(_)));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn zero_diagnostic_limit_is_rejected() {
        let err = RagConfig::builder().diagnostic_limit(0).build().unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(msg) if msg.contains("diagnostic_limit")));
        assert!(RagConfig::from_json(r#"{"diagnostic_limit": 0}"#).is_err());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = RagConfig::from_json(r#"{"chunk_size": 100, "answer_language": "Spanish"}"#)
            .unwrap();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.answer_language.as_deref(), Some("Spanish"));
    }

    #[test]
    fn json_is_validated() {
        assert!(RagConfig::from_json(r#"{"chunk_size": 10, "chunk_overlap": 20}"#).is_err());
        assert!(RagConfig::from_json("not json").is_err());
    }
}
