//! Relevance scoring between a query and a chunk.
//!
//! Two independent measures are provided: [`cosine_similarity`] for embedding
//! vectors and [`lexical_score`] for raw text. A single ranking never mixes
//! them; see [`Retriever`](crate::Retriever).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Added to the query token count so the lexical score never divides by zero.
pub const LEXICAL_EPSILON: f32 = 1e-6;

/// Everything outside lowercase ASCII letters, digits and the Spanish accented
/// letters is treated as a word separator.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9áéíóúñ]+").expect("unreachable error: invalid word pattern")
});

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector is empty, the lengths differ, or either
/// vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Lowercase `text`, drop separators and return its set of distinct words.
pub fn normalize_tokens(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    NON_WORD.split(&lowered).filter(|t| !t.is_empty()).map(str::to_string).collect()
}

/// Fraction of the query's distinct words that also appear in the chunk.
///
/// The score is normalized by the query size only, so a chunk covering every
/// query word scores (almost) 1.0 regardless of its own length. Returns 0.0
/// when either side has no words.
pub fn lexical_score(query: &str, chunk: &str) -> f32 {
    let query_tokens = normalize_tokens(query);
    let chunk_tokens = normalize_tokens(chunk);
    lexical_overlap(&query_tokens, &chunk_tokens)
}

/// [`lexical_score`] over already-normalized token sets.
pub fn lexical_overlap(query_tokens: &HashSet<String>, chunk_tokens: &HashSet<String>) -> f32 {
    if query_tokens.is_empty() || chunk_tokens.is_empty() {
        return 0.0;
    }
    let shared = query_tokens.intersection(chunk_tokens).count();
    shared as f32 / (query_tokens.len() as f32 + LEXICAL_EPSILON)
}
