//! Error types for the `promptlab-model` crate.

use thiserror::Error;

/// Errors that can occur when calling a hosted model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No API key was configured for the provider.
    #[error("No API key configured for {provider}; set one of: {variables}")]
    MissingApiKey {
        /// The provider that needs the key.
        provider: String,
        /// The environment variables that are consulted, comma separated.
        variables: String,
    },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("Request to {provider} failed: {message}")]
    Request {
        /// The provider that was called.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("{provider} returned {status}: {message}")]
    Api {
        /// The provider that was called.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Error detail extracted from the response body.
        message: String,
    },

    /// The provider answered successfully but without usable content.
    #[error("{provider} returned an empty response")]
    EmptyResponse {
        /// The provider that was called.
        provider: String,
    },

    /// Both the primary and the fallback backend failed.
    #[error("All generation backends failed (primary: {primary}; fallback: {fallback})")]
    Exhausted {
        /// Failure reported by the primary backend.
        primary: String,
        /// Failure reported by the fallback backend.
        fallback: String,
    },
}

impl ModelError {
    /// Whether this error signals an exhausted quota or a rate limit.
    ///
    /// HTTP 429 always qualifies. Other errors qualify when their message
    /// mentions a quota, a rate limit or an exhausted resource.
    pub fn is_quota(&self) -> bool {
        if let ModelError::Api { status: 429, .. } = self {
            return true;
        }
        let message = self.to_string().to_lowercase();
        message.contains("429")
            || message.contains("quota")
            || message.contains("rate limit")
            || message.contains("resource_exhausted")
            || message.contains("resourceexhausted")
            || message.contains("resource exhausted")
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
