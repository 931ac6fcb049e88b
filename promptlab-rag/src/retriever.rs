//! Chunk ranking with graceful degradation.
//!
//! The [`Retriever`] scores every chunk against a query, preferring embedding
//! similarity and falling back to lexical overlap when no embedding provider
//! is configured or any embedding call fails. Retrieval itself never fails.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{info, warn};

use crate::document::{Chunk, RetrievalResult, ScoredChunk, ScoringMethod};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::scoring::{cosine_similarity, lexical_overlap, normalize_tokens};

/// Default cap on the length of the diagnostic attached to a fallback.
pub const DEFAULT_DIAGNOSTIC_LIMIT: usize = 200;

/// Scores for a list of chunks, tagged with the method that produced them.
///
/// Scores are index-aligned with the chunks that were scored.
#[derive(Debug, Clone, PartialEq)]
pub enum Scoring {
    /// Cosine similarity of every chunk embedding to the query embedding.
    Vector(Vec<f32>),
    /// Lexical overlap with the raw query.
    Lexical {
        /// One score per chunk.
        scores: Vec<f32>,
        /// The embedding failure that forced this path, if any.
        diagnostic: Option<String>,
    },
}

impl Scoring {
    /// The scoring method.
    pub fn method(&self) -> ScoringMethod {
        match self {
            Scoring::Vector(_) => ScoringMethod::Vector,
            Scoring::Lexical { .. } => ScoringMethod::Lexical,
        }
    }

    /// One score per chunk.
    pub fn scores(&self) -> &[f32] {
        match self {
            Scoring::Vector(scores) => scores,
            Scoring::Lexical { scores, .. } => scores,
        }
    }
}

/// Ranks chunks against a query and selects the best `k`.
///
/// # Example
///
/// ```rust,ignore
/// use promptlab_rag::{chunk_text, Retriever};
///
/// let chunks = chunk_text(&document.text, 220, 50)?;
/// let result = Retriever::new(Arc::new(embedder)).retrieve("capital of France", &chunks, 3).await;
/// if !result.used_vector_path() {
///     eprintln!("fell back to keyword search: {:?}", result.diagnostic);
/// }
/// ```
#[derive(Clone)]
pub struct Retriever {
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    diagnostic_limit: usize,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::lexical()
    }
}

impl Retriever {
    /// A retriever that tries embeddings first.
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedding_provider: Some(embedding_provider), diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT }
    }

    /// A retriever that only scores lexically.
    pub fn lexical() -> Self {
        Self { embedding_provider: None, diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT }
    }

    /// Set the maximum number of characters kept from an embedding error.
    ///
    /// At least one character is always kept.
    pub fn with_diagnostic_limit(mut self, limit: usize) -> Self {
        self.diagnostic_limit = limit.max(1);
        self
    }

    /// Score every chunk, using one method for all of them.
    ///
    /// The vector path is all-or-nothing: if embedding the query or any
    /// chunk fails, every vector score is discarded and the chunks are
    /// rescored lexically.
    pub async fn score_all(&self, query: &str, chunks: &[Chunk]) -> Scoring {
        let Some(provider) = &self.embedding_provider else {
            return Scoring::Lexical { scores: score_lexically(query, chunks), diagnostic: None };
        };

        match score_by_vector(provider.as_ref(), query, chunks).await {
            Ok(scores) => Scoring::Vector(scores),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "embedding failed, falling back to lexical scoring");
                let diagnostic = truncate_diagnostic(&e.to_string(), self.diagnostic_limit);
                Scoring::Lexical { scores: score_lexically(query, chunks), diagnostic: Some(diagnostic) }
            }
        }
    }

    /// Select the `k` chunks most relevant to `query`.
    ///
    /// Always returns `min(k, chunks.len())` chunks. When every score is at
    /// or below zero the first `k` chunks in document order are returned.
    pub async fn retrieve(&self, query: &str, chunks: &[Chunk], k: usize) -> RetrievalResult {
        let scoring = self.score_all(query, chunks).await;
        let method = scoring.method();
        let (selected, used_leading_chunks) = select_top_k(chunks, scoring.scores(), k);
        let diagnostic = match scoring {
            Scoring::Vector(_) => None,
            Scoring::Lexical { diagnostic, .. } => diagnostic,
        };

        info!(
            ?method,
            chunk_count = chunks.len(),
            selected = selected.len(),
            used_leading_chunks,
            "retrieval completed"
        );

        RetrievalResult { chunks: selected, method, used_leading_chunks, diagnostic }
    }
}

async fn score_by_vector(
    provider: &dyn EmbeddingProvider,
    query: &str,
    chunks: &[Chunk],
) -> Result<Vec<f32>> {
    let query_embedding = provider.embed(query).await?;

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let embeddings = provider.embed_batch(&texts).await?;
    if embeddings.len() != chunks.len() {
        return Err(RagError::Embedding {
            provider: provider.name().to_string(),
            message: format!("expected {} embeddings, received {}", chunks.len(), embeddings.len()),
        });
    }

    Ok(embeddings.iter().map(|embedding| cosine_similarity(&query_embedding, embedding)).collect())
}

fn score_lexically(query: &str, chunks: &[Chunk]) -> Vec<f32> {
    let query_tokens = normalize_tokens(query);
    chunks.iter().map(|c| lexical_overlap(&query_tokens, &normalize_tokens(&c.text))).collect()
}

/// Pick up to `k` chunks by descending score.
///
/// Ties keep document order. If `scores` is empty or no score is above zero,
/// the first `k` chunks are returned in document order and the flag is set.
pub fn select_top_k(chunks: &[Chunk], scores: &[f32], k: usize) -> (Vec<ScoredChunk>, bool) {
    let score_of = |i: usize| scores.get(i).copied().unwrap_or(0.0);

    if scores.is_empty() || scores.iter().all(|s| *s <= 0.0) {
        let leading = chunks
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, chunk)| ScoredChunk { chunk: chunk.clone(), score: score_of(i) })
            .collect();
        return (leading, true);
    }

    let mut ranked: Vec<(usize, f32)> = (0..chunks.len()).map(|i| (i, score_of(i))).collect();
    // `sort_by` is stable, so equal scores stay in document order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    let selected = ranked
        .into_iter()
        .take(k)
        .map(|(i, score)| ScoredChunk { chunk: chunks[i].clone(), score })
        .collect();
    (selected, false)
}

/// Cut `message` to at most `limit` characters.
pub fn truncate_diagnostic(message: &str, limit: usize) -> String {
    message.chars().take(limit).collect()
}
