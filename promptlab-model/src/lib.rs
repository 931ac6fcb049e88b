//! # promptlab-model
//!
//! Hosted language model clients for Promptlab.
//!
//! ## Overview
//!
//! This crate provides the text generation and embedding backends used by the
//! retrieval pipeline in `promptlab-rag`:
//!
//! - [`TextGenerator`] - the async generation interface every backend implements
//! - [`GeminiClient`] - Google Gemini REST API (generation and embeddings)
//! - [`GroqClient`] - Groq OpenAI-compatible chat completions
//! - [`FallbackGenerator`] - switches to a secondary backend on quota errors
//! - [`MockGenerator`] - canned responses for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promptlab_model::{FallbackGenerator, GeminiClient, GeminiConfig, GenerationRequest, TextGenerator};
//! use std::sync::Arc;
//!
//! # async fn run() -> promptlab_model::Result<()> {
//! let gemini = Arc::new(GeminiClient::new(GeminiConfig::from_env()?)?);
//! let generator = FallbackGenerator::new(gemini);
//! let answer = generator.generate(&GenerationRequest::new("Say hello")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `gemini` (default) - [`GeminiClient`]
//! - `groq` (default) - [`GroqClient`]

pub mod error;
pub mod fallback;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod generator;
#[cfg(feature = "groq")]
pub mod groq;
pub mod mock;

pub use error::{ModelError, Result};
pub use fallback::FallbackGenerator;
#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, GeminiConfig};
pub use generator::{GenerationRequest, TextGenerator};
#[cfg(feature = "groq")]
pub use groq::{GroqClient, GroqConfig};
pub use mock::MockGenerator;
