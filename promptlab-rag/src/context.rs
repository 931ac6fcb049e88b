//! Context block assembly.

use crate::document::RetrievalResult;

/// Separator placed between chunks in the context block.
pub const DEFAULT_SEPARATOR: &str = "\n\n---\n\n";

/// Joins retrieved chunks into the context block handed to the generator.
///
/// Chunks keep the order chosen by the retriever. When the lexical path was
/// used, a note saying so is appended, followed by the diagnostic if the
/// embedding backend failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAssembler {
    separator: String,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self { separator: DEFAULT_SEPARATOR.to_string() }
    }
}

impl ContextAssembler {
    /// Create an assembler with the default separator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different separator between chunks.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Build the context block for `result`.
    pub fn assemble(&self, result: &RetrievalResult) -> String {
        let mut block = result.texts().collect::<Vec<_>>().join(&self.separator);
        if let Some(note) = fallback_note(result) {
            block.push_str(&note);
        }
        block
    }
}

fn fallback_note(result: &RetrievalResult) -> Option<String> {
    if result.used_vector_path() {
        return None;
    }
    let mut note = String::from(
        "\n\nNOTE: Embeddings could not be used for this answer. \
         The fragments were selected by keyword matching.",
    );
    if let Some(detail) = result.diagnostic.as_deref().filter(|d| !d.is_empty()) {
        note.push_str("\nTechnical detail: ");
        note.push_str(detail);
    }
    Some(note)
}
