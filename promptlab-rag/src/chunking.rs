//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`WordWindowChunker`], which
//! splits text into fixed-size windows of word tokens with a configurable
//! overlap between consecutive windows.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Chunks must come back in ascending offset order.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no tokens.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into windows of `chunk_size` word tokens.
///
/// Consecutive windows start `chunk_size - chunk_overlap` tokens apart. The
/// last window ends at the final token of the text and may be shorter than
/// `chunk_size`.
///
/// # Example
///
/// ```rust
/// use promptlab_rag::{Chunker, Document, WordWindowChunker};
///
/// let chunker = WordWindowChunker::new(5, 2)?;
/// let chunks = chunker.chunk(&Document::from_text("one two three four five six seven"));
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].text, "four five six seven");
/// # Ok::<(), promptlab_rag::RagError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordWindowChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - number of tokens per window
    /// * `chunk_overlap` - number of tokens shared by consecutive windows
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfig`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Number of tokens per window.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of tokens shared by consecutive windows.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split raw text into chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        // Whitespace splitting also absorbs the `\r` left behind by extractors.
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let total = tokens.len();

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < total {
            let end = (start + self.chunk_size).min(total);
            chunks.push(Chunk {
                index: chunks.len(),
                offset: start,
                token_count: end - start,
                text: tokens[start..end].join(" "),
            });
            if end == total {
                break;
            }
            // end - start == chunk_size here, so the next start is strictly greater.
            start = end - self.chunk_overlap;
        }

        chunks
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.split(&document.text)
    }
}

/// Split `text` into overlapping word windows.
///
/// Convenience wrapper around [`WordWindowChunker`].
///
/// # Errors
///
/// Returns [`RagError::InvalidConfig`] if `chunk_overlap >= chunk_size` or
/// `chunk_size` is zero.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<Chunk>> {
    Ok(WordWindowChunker::new(chunk_size, chunk_overlap)?.split(text))
}
