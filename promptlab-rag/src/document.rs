//! Data types for documents, chunks, and retrieval results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Plain text extracted from one source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Extracted text, one line-joined segment per page that yielded text.
    pub text: String,
    /// Number of pages the source had, including ones that failed to extract.
    pub page_count: usize,
    /// Where the text came from, if it was loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl Document {
    /// Wrap text that did not come from a file.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into(), page_count: 1, source: None }
    }

    /// Whether the document holds no retrievable text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A window of consecutive word tokens from a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in document order, starting at 0.
    pub index: usize,
    /// Index of the first token of the window.
    pub offset: usize,
    /// Number of tokens in the window.
    pub token_count: usize,
    /// The window's tokens joined by single spaces.
    pub text: String,
}

impl Chunk {
    /// Index one past the last token of the window.
    pub fn end(&self) -> usize {
        self.offset + self.token_count
    }
}

/// How a set of chunks was scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Cosine similarity between embeddings.
    Vector,
    /// Token overlap with the raw query.
    Lexical,
}

/// A [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The relevance score (higher is more relevant).
    pub score: f32,
}

/// The chunks selected for one query and how they were chosen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Selected chunks, most relevant first.
    pub chunks: Vec<ScoredChunk>,
    /// Scoring method that produced `chunks`.
    pub method: ScoringMethod,
    /// True when no chunk scored above zero and the leading chunks were used instead.
    pub used_leading_chunks: bool,
    /// Why the vector path was abandoned, truncated for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl RetrievalResult {
    /// Whether the chunks were ranked by embedding similarity.
    pub fn used_vector_path(&self) -> bool {
        self.method == ScoringMethod::Vector
    }

    /// Texts of the selected chunks, in selection order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.chunk.text.as_str())
    }
}
