//! # promptlab-rag
//!
//! Retrieval-augmented question answering over a single document.
//!
//! ## Overview
//!
//! Each query runs the whole pipeline from scratch:
//!
//! - [`DocumentLoader`] - extracts text page by page, skipping pages that fail
//! - [`WordWindowChunker`] - overlapping windows of word tokens
//! - [`Retriever`] - embedding similarity with a lexical fallback that never fails
//! - [`ContextAssembler`] - joins the selected chunks into one context block
//! - [`RagPipeline`] - ties the steps together and calls the [`TextGenerator`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use promptlab_model::MockGenerator;
//! use promptlab_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .generator(Arc::new(MockGenerator::with_response("Paris.")))
//!     .build()?;
//!
//! let answer = pipeline.answer_text("What is the capital?", "Paris is the capital of France.").await?;
//! println!("{answer}");
//! ```
//!
//! ## Features
//!
//! - `pdf` (default) - PDF extraction with `lopdf`
//! - `gemini` (default) - [`GeminiEmbeddingProvider`]
//!
//! [`TextGenerator`]: promptlab_model::TextGenerator

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod scoring;

pub use chunking::{Chunker, WordWindowChunker, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{ContextAssembler, DEFAULT_SEPARATOR};
pub use document::{Chunk, Document, RetrievalResult, ScoredChunk, ScoringMethod};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
#[cfg(feature = "gemini")]
pub use gemini::GeminiEmbeddingProvider;
#[cfg(feature = "pdf")]
pub use loader::PdfExtractor;
pub use loader::{DocumentLoader, PageExtractor, PlainTextExtractor};
pub use pipeline::{RagAnswer, RagPipeline, RagPipelineBuilder, RetrieveOutcome, RetrievedContext};
pub use prompt::build_prompt;
pub use retriever::{DEFAULT_DIAGNOSTIC_LIMIT, Retriever, Scoring, select_top_k, truncate_diagnostic};
pub use scoring::{cosine_similarity, lexical_score};
