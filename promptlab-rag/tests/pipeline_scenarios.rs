//! End-to-end pipeline scenarios with in-process collaborators.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use promptlab_model::MockGenerator;
use promptlab_rag::{
    EmbeddingProvider, PageExtractor, RagAnswer, RagConfig, RagError, RagPipeline, Retriever,
    RetrieveOutcome, ScoringMethod, chunk_text,
};

const PARIS: &str = "Paris is the capital of France. The Eiffel Tower is in Paris.";

struct QuotaExceeded {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for QuotaExceeded {
    fn name(&self) -> &str {
        "quota-exceeded"
    }

    async fn embed(&self, _text: &str) -> promptlab_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RagError::Embedding {
            provider: "Gemini".into(),
            message: format!("429 RESOURCE_EXHAUSTED: {}", "quota exceeded for metric ".repeat(20)),
        })
    }
}

/// Pages come from a fixed list; the second page always fails.
struct ScriptedPages(Vec<&'static str>);

impl PageExtractor for ScriptedPages {
    fn name(&self) -> &str {
        "scripted"
    }

    fn extract_pages(&self, path: &Path) -> promptlab_rag::Result<Vec<promptlab_rag::Result<String>>> {
        Ok(self
            .0
            .iter()
            .enumerate()
            .map(|(i, page)| {
                if i == 1 {
                    Err(RagError::Extraction { path: path.to_path_buf(), message: "bad xref".into() })
                } else {
                    Ok(page.to_string())
                }
            })
            .collect())
    }
}

fn small_config() -> RagConfig {
    RagConfig::builder().chunk_size(5).chunk_overlap(2).top_k(3).build().unwrap()
}

fn text_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn lexical_ranking_prefers_the_capital_chunk() {
    let chunks = chunk_text(PARIS, 5, 2).unwrap();
    let result = Retriever::lexical().retrieve("capital of France", &chunks, 4).await;

    assert_eq!(result.method, ScoringMethod::Lexical);
    let order: Vec<usize> = result.chunks.iter().map(|c| c.chunk.index).collect();
    let first = order.iter().position(|&i| i == 0).unwrap();
    let eiffel_only = order.iter().position(|&i| i == 2).unwrap();
    assert!(first < eiffel_only);
    assert!(result.chunks[0].score > result.chunks[2].score);
}

#[tokio::test]
async fn embedding_outage_still_answers() {
    let embedder = Arc::new(QuotaExceeded { calls: AtomicUsize::new(0) });
    let generator = Arc::new(MockGenerator::with_response("Paris is the capital."));
    let pipeline = RagPipeline::builder()
        .config(small_config())
        .generator(generator.clone())
        .embedding_provider(embedder.clone())
        .build()
        .unwrap();

    let file = text_file(PARIS);
    let answer = pipeline.answer("What is the capital of France?", file.path()).await.unwrap();

    let retrieval = answer.retrieval().unwrap();
    assert!(!retrieval.used_vector_path());
    let diagnostic = retrieval.diagnostic.as_deref().unwrap();
    assert!(!diagnostic.is_empty());
    assert!(diagnostic.chars().count() <= 200);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);

    let prompts = generator.prompts().await;
    assert!(prompts[0].contains("Technical detail: Embedding error (Gemini): 429"));
    assert_eq!(answer.text(), Some("Paris is the capital."));
}

#[tokio::test]
async fn empty_document_reports_nothing_to_extract() {
    let generator = Arc::new(MockGenerator::echo());
    let pipeline =
        RagPipeline::builder().config(small_config()).generator(generator.clone()).build().unwrap();

    let file = text_file("");
    let answer = pipeline.answer("anything?", file.path()).await.unwrap();

    assert_eq!(answer, RagAnswer::NothingToExtract);
    assert!(!answer.to_string().is_empty());
    assert!(generator.prompts().await.is_empty());
}

#[tokio::test]
async fn missing_document_is_an_error() {
    let pipeline = RagPipeline::builder()
        .config(small_config())
        .generator(Arc::new(MockGenerator::echo()))
        .build()
        .unwrap();

    let err = pipeline.answer("q", Path::new("/no/such/manual.txt")).await.unwrap_err();
    assert!(matches!(err, RagError::NotFound { .. }));
}

#[tokio::test]
async fn broken_pages_are_skipped() {
    let pipeline = RagPipeline::builder()
        .config(small_config())
        .generator(Arc::new(MockGenerator::echo()))
        .extractor(Arc::new(ScriptedPages(vec!["Paris is the capital.", "unreachable", "Lyon has silk."])))
        .build()
        .unwrap();

    let file = text_file("placeholder");
    let outcome = pipeline.retrieve_document("silk", file.path()).await.unwrap();
    let RetrieveOutcome::Retrieved(retrieved) = outcome else {
        panic!("expected retrieval to run");
    };

    assert!(!retrieved.context.contains("unreachable"));
    assert!(retrieved.context.starts_with("capital. Lyon has silk."));
}

#[tokio::test]
async fn retrieve_document_skips_blank_questions() {
    let pipeline = RagPipeline::builder()
        .config(small_config())
        .generator(Arc::new(MockGenerator::echo()))
        .build()
        .unwrap();

    let file = text_file(PARIS);
    let outcome = pipeline.retrieve_document("  ", file.path()).await.unwrap();
    assert_eq!(outcome, RetrieveOutcome::Skipped(RagAnswer::EmptyQuestion));
}

#[tokio::test]
async fn answer_language_reaches_the_prompt() {
    let generator = Arc::new(MockGenerator::echo());
    let config = RagConfig::builder().answer_language("Spanish").build().unwrap();
    let pipeline = RagPipeline::builder().config(config).generator(generator).build().unwrap();

    let answer = pipeline.answer_text("capital?", PARIS).await.unwrap();
    assert!(answer.text().unwrap().contains("Answer in Spanish"));
}
