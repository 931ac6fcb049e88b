//! Offline command tests: argument parsing, config layering and the
//! commands that never call a model.

use std::io::Write;

use clap::Parser;
use promptlab_cli::{Cli, Command, run};

const PARIS: &str = "Paris is the capital of France. The Eiffel Tower is in Paris.";

fn text_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn flags_override_config_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    config.write_all(br#"{"chunk_size": 100, "chunk_overlap": 10, "top_k": 4}"#).unwrap();
    let config_path = config.path().to_str().unwrap();

    let cli = Cli::try_parse_from([
        "promptlab", "chunks", "doc.txt", "--config", config_path, "--overlap", "20", "--language", "Spanish",
    ])
    .unwrap();
    let resolved = cli.rag_config().unwrap();

    assert_eq!(resolved.chunk_size, 100);
    assert_eq!(resolved.chunk_overlap, 20);
    assert_eq!(resolved.top_k, 4);
    assert_eq!(resolved.answer_language.as_deref(), Some("Spanish"));
}

#[test]
fn invalid_overlap_is_rejected() {
    let cli = Cli::try_parse_from(["promptlab", "chunks", "doc.txt", "--chunk-size", "5", "--overlap", "5"])
        .unwrap();
    let err = cli.rag_config().unwrap_err();
    assert!(err.to_string().contains("chunk_overlap"));
}

#[test]
fn ask_parses_lexical_only() {
    let cli = Cli::try_parse_from(["promptlab", "ask", "doc.pdf", "what?", "--lexical-only", "-k", "2"]).unwrap();
    assert_eq!(cli.top_k, Some(2));
    assert!(matches!(cli.command, Command::Ask { lexical_only: true, json: false, .. }));
}

#[tokio::test]
async fn chunks_lists_windows() {
    let file = text_file(PARIS);
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["promptlab", "chunks", path, "--chunk-size", "5", "--overlap", "2"]).unwrap();

    let out = run(cli).await.unwrap();
    assert!(out.starts_with("4 chunks\n"));
    assert!(out.contains("capital of France. The Eiffel"));
}

#[tokio::test]
async fn retrieve_runs_offline() {
    let file = text_file(PARIS);
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from([
        "promptlab", "retrieve", path, "capital of France", "--chunk-size", "5", "--overlap", "2", "--top-k", "2",
    ])
    .unwrap();

    let out = run(cli).await.unwrap();
    assert!(out.starts_with("Method: Lexical\n"));
    assert!(out.contains("Context:\ncapital of France. The Eiffel\n\n---\n\nParis is the capital of"));
}

#[tokio::test]
async fn retrieve_reports_empty_document() {
    let file = text_file("   ");
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["promptlab", "retrieve", path, "anything"]).unwrap();

    let out = run(cli).await.unwrap();
    assert_eq!(out, promptlab_rag::RagAnswer::NothingToExtract.to_string());
}

#[tokio::test]
async fn missing_document_is_an_error() {
    let cli = Cli::try_parse_from(["promptlab", "chunks", "/no/such/file.txt"]).unwrap();
    assert!(run(cli).await.is_err());
}

#[tokio::test]
async fn retrieve_reports_blank_question() {
    let file = text_file(PARIS);
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["promptlab", "retrieve", path, "   "]).unwrap();

    let out = run(cli).await.unwrap();
    assert_eq!(out, promptlab_rag::RagAnswer::EmptyQuestion.to_string());
}
