//! Error types for the `promptlab-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// Embedding failures are recovered inside the [`Retriever`](crate::Retriever)
/// and never reach callers of the pipeline; loading and generation failures do.
#[derive(Debug, Error)]
pub enum RagError {
    /// The input document does not exist.
    #[error("Document not found: {}", path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// A capability needed to read the document is not available in this build.
    #[error("{capability} is not available: {hint}")]
    DependencyMissing {
        /// The missing capability, e.g. "PDF extraction".
        capability: String,
        /// How to make it available.
        hint: String,
    },

    /// The document exists but could not be opened or parsed at all.
    #[error("Failed to extract text from {}: {message}", path.display())]
    Extraction {
        /// The document being read.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The final answer could not be generated.
    #[error("Generation failed: {0}")]
    Generation(#[from] promptlab_model::ModelError),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
