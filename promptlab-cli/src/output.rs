//! Output formatting for answers, retrievals and chunk listings.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use promptlab_rag::{Chunk, RagAnswer, RetrievalResult};
use serde_json::json;

/// Formats an answer for the terminal.
///
/// When the vector path was abandoned the reason is printed after the
/// answer so the user knows why the fragments may be less relevant.
pub fn answer_human(answer: &RagAnswer) -> String {
    let mut out = answer.to_string();
    if let Some(retrieval) = answer.retrieval() {
        if let Some(diagnostic) = &retrieval.diagnostic {
            out.push_str(&format!("\n\n(keyword search used: {diagnostic})"));
        }
    }
    out
}

/// Formats an answer as JSON.
pub fn answer_json(question: &str, answer: &RagAnswer) -> String {
    let value = match answer {
        RagAnswer::Generated { text, retrieval } => json!({
            "question": question,
            "answer": text,
            "retrieval": retrieval,
        }),
        other => json!({
            "question": question,
            "answer": null,
            "message": other.to_string(),
        }),
    };
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a retrieval and its context block for the terminal.
pub fn retrieval_human(retrieval: &RetrievalResult, context: &str) -> String {
    let mut out = format!(
        "Method: {:?}{}\n\n",
        retrieval.method,
        if retrieval.used_leading_chunks { " (no fragment matched, using the first ones)" } else { "" }
    );
    for scored in &retrieval.chunks {
        out.push_str(&format!(
            "  #{:<4} score {:.3}  words {}..{}\n",
            scored.chunk.index,
            scored.score,
            scored.chunk.offset,
            scored.chunk.end()
        ));
    }
    out.push_str("\nContext:\n");
    out.push_str(context);
    out
}

/// Formats a retrieval as JSON.
pub fn retrieval_json(question: &str, retrieval: &RetrievalResult) -> String {
    let value = json!({ "question": question, "retrieval": retrieval });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

/// Lists chunks with their word ranges and a text preview.
pub fn chunks_human(chunks: &[Chunk], preview: usize) -> String {
    if chunks.is_empty() {
        return "No chunks: the document has no text.".to_string();
    }
    let mut out = format!("{} chunks\n", chunks.len());
    for chunk in chunks {
        out.push_str(&format!(
            "#{:<4} words {:>6}..{:<6} {}\n",
            chunk.index,
            chunk.offset,
            chunk.end(),
            truncate_text(&chunk.text, preview)
        ));
    }
    out
}

/// Truncates text to `max_chars`, appending "..." when shortened.
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use promptlab_rag::{ScoredChunk, ScoringMethod, chunk_text};

    use super::*;

    fn retrieval(diagnostic: Option<&str>) -> RetrievalResult {
        let chunks = chunk_text("alpha beta gamma delta", 2, 0).unwrap();
        RetrievalResult {
            chunks: vec![ScoredChunk { chunk: chunks[1].clone(), score: 0.5 }],
            method: ScoringMethod::Lexical,
            used_leading_chunks: false,
            diagnostic: diagnostic.map(str::to_string),
        }
    }

    #[test]
    fn truncates_by_characters() {
        assert_eq!(truncate_text("ñandú corre", 5), "ñandú...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn human_answer_mentions_fallback_reason() {
        let answer = RagAnswer::Generated { text: "42".into(), retrieval: retrieval(Some("429 quota")) };
        assert_eq!(answer_human(&answer), "42\n\n(keyword search used: 429 quota)");
    }

    #[test]
    fn soft_answers_serialize_with_message() {
        let out = answer_json("q", &RagAnswer::NothingToExtract);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["answer"].is_null());
        assert_eq!(value["message"], RagAnswer::NothingToExtract.to_string());
    }

    #[test]
    fn retrieval_json_uses_snake_case_method() {
        let out = retrieval_json("q", &retrieval(None));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["retrieval"]["method"], "lexical");
        assert_eq!(value["retrieval"]["chunks"][0]["chunk"]["text"], "gamma delta");
    }

    #[test]
    fn chunk_listing_shows_ranges() {
        let chunks = chunk_text("one two three four five", 3, 1).unwrap();
        let out = chunks_human(&chunks, 40);
        assert!(out.starts_with("2 chunks\n"));
        assert!(out.contains("three four five"));
    }
}
