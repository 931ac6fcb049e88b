//! Question answering over a single document.
//!
//! The [`RagPipeline`] runs one query end to end: load the document, chunk
//! it, retrieve the most relevant chunks, assemble the context block and ask
//! the [`TextGenerator`] for an answer. Nothing is cached between calls;
//! every query recomputes its chunks.
//!
//! # Example
//!
//! ```rust,ignore
//! use promptlab_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .generator(Arc::new(gemini_client))
//!     .embedding_provider(Arc::new(embedder))  // optional
//!     .build()?;
//!
//! let answer = pipeline.answer("What is the capital?", "manual.pdf".as_ref()).await?;
//! println!("{answer}");
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use promptlab_model::{GenerationRequest, TextGenerator};

use crate::chunking::{Chunker, WordWindowChunker};
use crate::config::RagConfig;
use crate::context::ContextAssembler;
use crate::document::{Document, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::loader::{DocumentLoader, PageExtractor};
use crate::prompt::build_prompt;
use crate::retriever::Retriever;

/// The outcome of a question.
///
/// Only [`RagAnswer::Generated`] carries model output; the other variants
/// are expected situations reported to the user instead of errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RagAnswer {
    /// The question was empty after trimming.
    EmptyQuestion,
    /// The document yielded no text.
    NothingToExtract,
    /// The text could not be split into any chunk.
    NoChunks,
    /// The model answered.
    Generated {
        /// The answer text.
        text: String,
        /// The chunks the answer was grounded on.
        retrieval: RetrievalResult,
    },
}

impl RagAnswer {
    /// The generated answer, if the model was called.
    pub fn text(&self) -> Option<&str> {
        match self {
            RagAnswer::Generated { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The retrieval behind a generated answer.
    pub fn retrieval(&self) -> Option<&RetrievalResult> {
        match self {
            RagAnswer::Generated { retrieval, .. } => Some(retrieval),
            _ => None,
        }
    }
}

impl fmt::Display for RagAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagAnswer::EmptyQuestion => f.write_str("No question was received."),
            RagAnswer::NothingToExtract => f.write_str("Could not extract any text from the document."),
            RagAnswer::NoChunks => f.write_str("Could not split the document into text fragments."),
            RagAnswer::Generated { text, .. } => f.write_str(text),
        }
    }
}

/// Selected chunks and the context block built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    /// Chunks chosen by the retriever.
    pub retrieval: RetrievalResult,
    /// Context block as it would be sent to the model.
    pub context: String,
}

/// Result of [`RagPipeline::retrieve_document`].
#[derive(Debug, Clone, PartialEq)]
pub enum RetrieveOutcome {
    /// Retrieval did not run; the answer explains why.
    Skipped(RagAnswer),
    /// Retrieval ran.
    Retrieved(RetrievedContext),
}

/// Retrieval-augmented answering over one document per call.
///
/// Construct one via [`RagPipeline::builder()`]. A pipeline built with
/// [`RagPipelineBuilder::build_retrieval_only`] has no model and can only
/// run [`RagPipeline::retrieve_document`].
pub struct RagPipeline {
    config: RagConfig,
    generator: Option<Arc<dyn TextGenerator>>,
    retriever: Retriever,
    chunker: Arc<dyn Chunker>,
    extractor: Option<Arc<dyn PageExtractor>>,
    assembler: ContextAssembler,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Load the document at `path` on a blocking worker.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`], [`RagError::DependencyMissing`] or
    /// [`RagError::Extraction`] as reported by the [`DocumentLoader`].
    pub async fn load(&self, path: &Path) -> Result<Document> {
        let loader = match &self.extractor {
            Some(extractor) => DocumentLoader::new(Arc::clone(extractor)),
            None => DocumentLoader::for_path(path)?,
        };

        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || loader.load(&owned)).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "extraction task failed");
            RagError::Extraction { path: path.to_path_buf(), message: format!("extraction task failed: {e}") }
        })?
    }

    /// Answer `question` from the document at `path`.
    ///
    /// # Errors
    ///
    /// Loading errors and [`RagError::Generation`] are returned; embedding
    /// failures are absorbed by the retriever. A retrieval-only pipeline
    /// returns [`RagError::InvalidConfig`] once it has a context to send.
    pub async fn answer(&self, question: &str, path: &Path) -> Result<RagAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(RagAnswer::EmptyQuestion);
        }
        let document = self.load(path).await?;
        self.answer_document(question, &document).await
    }

    /// Answer `question` from text that was already extracted.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Generation`] if the model call fails.
    pub async fn answer_text(&self, question: &str, text: &str) -> Result<RagAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(RagAnswer::EmptyQuestion);
        }
        self.answer_document(question, &Document::from_text(text)).await
    }

    /// Run every step up to context assembly without calling the model.
    ///
    /// # Errors
    ///
    /// Returns the same loading errors as [`RagPipeline::answer`].
    pub async fn retrieve_document(&self, question: &str, path: &Path) -> Result<RetrieveOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(RetrieveOutcome::Skipped(RagAnswer::EmptyQuestion));
        }
        let document = self.load(path).await?;
        Ok(self.retrieve(question, &document).await)
    }

    async fn answer_document(&self, question: &str, document: &Document) -> Result<RagAnswer> {
        let retrieved = match self.retrieve(question, document).await {
            RetrieveOutcome::Skipped(answer) => return Ok(answer),
            RetrieveOutcome::Retrieved(retrieved) => retrieved,
        };

        let generator = self.generator.as_ref().ok_or_else(|| {
            RagError::InvalidConfig("a generator is required to answer questions".to_string())
        })?;

        let prompt = build_prompt(question, &retrieved.context, self.config.answer_language.as_deref());
        let text = generator.generate(&GenerationRequest::new(prompt)).await.map_err(|e| {
            error!(generator = generator.name(), error = %e, "generation failed");
            RagError::from(e)
        })?;

        info!(
            generator = generator.name(),
            method = ?retrieved.retrieval.method,
            answer_chars = text.chars().count(),
            "answer generated"
        );

        Ok(RagAnswer::Generated { text, retrieval: retrieved.retrieval })
    }

    async fn retrieve(&self, question: &str, document: &Document) -> RetrieveOutcome {
        if document.is_blank() {
            info!("document has no text to retrieve from");
            return RetrieveOutcome::Skipped(RagAnswer::NothingToExtract);
        }

        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!("document produced no chunks");
            return RetrieveOutcome::Skipped(RagAnswer::NoChunks);
        }

        let retrieval = self.retriever.retrieve(question, &chunks, self.config.top_k).await;
        let context = self.assembler.assemble(&retrieval);
        RetrieveOutcome::Retrieved(RetrievedContext { retrieval, context })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config` and `generator` are required, except for
/// [`RagPipelineBuilder::build_retrieval_only`]. Without an embedding provider the
/// pipeline scores lexically; without a chunker it uses a
/// [`WordWindowChunker`] sized from the config.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    generator: Option<Arc<dyn TextGenerator>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
    extractor: Option<Arc<dyn PageExtractor>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the model that writes the answer.
    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Use `extractor` for every document instead of choosing by extension.
    pub fn extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Build the [`RagPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if a required field is missing or
    /// the config fails validation.
    pub fn build(self) -> Result<RagPipeline> {
        if self.generator.is_none() {
            return Err(RagError::InvalidConfig("generator is required".to_string()));
        }
        self.assemble()
    }

    /// Build a [`RagPipeline`] that retrieves context without a model.
    ///
    /// A generator set on the builder is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if the config is missing or fails
    /// validation.
    pub fn build_retrieval_only(self) -> Result<RagPipeline> {
        self.assemble()
    }

    fn assemble(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::InvalidConfig("config is required".to_string()))?;
        config.validate()?;

        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(WordWindowChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        let retriever = match self.embedding_provider {
            Some(provider) => Retriever::new(provider),
            None => Retriever::lexical(),
        }
        .with_diagnostic_limit(config.diagnostic_limit);

        Ok(RagPipeline {
            config,
            generator: self.generator,
            retriever,
            chunker,
            extractor: self.extractor,
            assembler: ContextAssembler::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use promptlab_model::MockGenerator;

    use super::*;

    fn pipeline(generator: Arc<MockGenerator>) -> RagPipeline {
        RagPipeline::builder()
            .config(RagConfig::builder().chunk_size(5).chunk_overlap(2).top_k(2).build().unwrap())
            .generator(generator)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_generator() {
        let err = RagPipeline::builder().config(RagConfig::default()).build().err().unwrap();
        assert!(matches!(err, RagError::InvalidConfig(msg) if msg.contains("generator")));
    }

    #[test]
    fn builder_requires_config() {
        let err = RagPipeline::builder()
            .generator(Arc::new(MockGenerator::echo()))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RagError::InvalidConfig(msg) if msg.contains("config")));
    }

    #[test]
    fn retrieval_only_still_requires_config() {
        let err = RagPipeline::builder().build_retrieval_only().err().unwrap();
        assert!(matches!(err, RagError::InvalidConfig(msg) if msg.contains("config")));
    }

    #[tokio::test]
    async fn retrieval_only_pipeline_cannot_answer() {
        let pipeline = RagPipeline::builder()
            .config(RagConfig::builder().chunk_size(5).chunk_overlap(2).build().unwrap())
            .build_retrieval_only()
            .unwrap();

        assert_eq!(pipeline.answer_text(" ", "text").await.unwrap(), RagAnswer::EmptyQuestion);
        let err = pipeline.answer_text("capital?", "Paris is the capital.").await.unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(msg) if msg.contains("generator")));
    }

    #[test]
    fn builder_validates_config() {
        let mut config = RagConfig::default();
        config.chunk_overlap = config.chunk_size;
        let result =
            RagPipeline::builder().config(config).generator(Arc::new(MockGenerator::echo())).build();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn blank_question_skips_everything() {
        let generator = Arc::new(MockGenerator::echo());
        let answer = pipeline(generator.clone()).answer_text("   ", "some text").await.unwrap();
        assert_eq!(answer, RagAnswer::EmptyQuestion);
        assert!(generator.prompts().await.is_empty());
    }

    #[tokio::test]
    async fn blank_text_is_nothing_to_extract() {
        let generator = Arc::new(MockGenerator::echo());
        let answer = pipeline(generator.clone()).answer_text("capital?", " \n\t ").await.unwrap();
        assert_eq!(answer, RagAnswer::NothingToExtract);
        assert_eq!(answer.to_string(), "Could not extract any text from the document.");
        assert!(generator.prompts().await.is_empty());
    }

    #[tokio::test]
    async fn empty_chunker_output_is_no_chunks() {
        struct NoChunks;

        impl Chunker for NoChunks {
            fn chunk(&self, _document: &Document) -> Vec<crate::document::Chunk> {
                Vec::new()
            }
        }

        let pipeline = RagPipeline::builder()
            .config(RagConfig::default())
            .generator(Arc::new(MockGenerator::echo()))
            .chunker(Arc::new(NoChunks))
            .build()
            .unwrap();
        let answer = pipeline.answer_text("q", "some text").await.unwrap();
        assert_eq!(answer, RagAnswer::NoChunks);
    }

    #[tokio::test]
    async fn prompt_carries_ranked_context() {
        let generator = Arc::new(MockGenerator::with_response("Paris."));
        let text = "Paris is the capital of France. The Eiffel Tower is in Paris.";
        let answer = pipeline(generator.clone()).answer_text("capital of France", text).await.unwrap();

        assert_eq!(answer.text(), Some("Paris."));
        let prompts = generator.prompts().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(
            "capital of France. The Eiffel\n\n---\n\nParis is the capital of"
        ));
        assert!(prompts[0].contains("keyword matching"));
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let generator = Arc::new(MockGenerator::failing(|| promptlab_model::ModelError::Exhausted {
            primary: "429".into(),
            fallback: "429".into(),
        }));
        let err = pipeline(generator).answer_text("q", "some text").await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
    }
}
