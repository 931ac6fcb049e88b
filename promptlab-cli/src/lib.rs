//! Command-line front end for Promptlab.
//!
//! # Usage
//!
//! ```bash
//! # Ask a question about a document
//! promptlab ask manual.pdf "How do I reset the device?"
//!
//! # Inspect which fragments would be sent to the model (offline)
//! promptlab retrieve manual.pdf "reset procedure" --top-k 5
//!
//! # Show how the document is chunked
//! promptlab chunks manual.pdf --chunk-size 120 --overlap 30
//! ```

pub mod backends;
pub mod output;
pub mod telemetry;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use promptlab_rag::{
    DocumentLoader, RagConfig, RagConfigBuilder, RagPipeline, RetrieveOutcome, WordWindowChunker,
};

/// Ask questions about a PDF or text document.
///
/// Answers are grounded on the most relevant fragments of the document.
/// API keys are read from the environment or a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "promptlab", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file with pipeline settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chunk size in words
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Words shared by consecutive chunks
    #[arg(long, global = true)]
    pub overlap: Option<usize>,

    /// Number of fragments used as context
    #[arg(short = 'k', long, global = true)]
    pub top_k: Option<usize>,

    /// Language of the answer, e.g. "Spanish"
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question from a document
    Ask {
        /// PDF or text document
        document: PathBuf,
        /// The question to answer
        question: String,
        /// Rank fragments by keyword overlap without calling the embedding API
        #[arg(long)]
        lexical_only: bool,
        /// Print the answer and retrieval details as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the fragments and context that would be sent to the model
    Retrieve {
        /// PDF or text document
        document: PathBuf,
        /// The question to retrieve fragments for
        question: String,
        /// Rank with Gemini embeddings instead of keyword overlap
        #[arg(long)]
        embeddings: bool,
        /// Print the retrieval as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the chunks a document is split into
    Chunks {
        /// PDF or text document
        document: PathBuf,
        /// Characters shown per chunk
        #[arg(long, default_value = "80")]
        preview: usize,
    },
}

impl Cli {
    /// Resolve the pipeline settings: defaults, then `--config`, then flags.
    pub fn rag_config(&self) -> Result<RagConfig> {
        let base = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                RagConfig::from_json(&json)?
            }
            None => RagConfig::default(),
        };

        let mut builder = RagConfigBuilder::from_config(base);
        if let Some(size) = self.chunk_size {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = self.overlap {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = self.top_k {
            builder = builder.top_k(k);
        }
        if let Some(language) = &self.language {
            builder = builder.answer_language(language);
        }
        Ok(builder.build()?)
    }
}

/// Run the parsed command and return what should be printed.
pub async fn run(cli: Cli) -> Result<String> {
    let config = cli.rag_config()?;
    info!(?config, "resolved configuration");

    match cli.command {
        Command::Ask { document, question, lexical_only, json } => {
            ask(config, &document, &question, lexical_only, json).await
        }
        Command::Retrieve { document, question, embeddings, json } => {
            retrieve(config, &document, &question, embeddings, json).await
        }
        Command::Chunks { document, preview } => chunks(&config, &document, preview).await,
    }
}

async fn ask(config: RagConfig, document: &Path, question: &str, lexical_only: bool, json: bool) -> Result<String> {
    let backends = backends::Backends::from_env(!lexical_only)?;

    let mut builder = RagPipeline::builder().config(config).generator(backends.generator);
    if let Some(embedder) = backends.embedder {
        builder = builder.embedding_provider(embedder);
    }
    let pipeline = builder.build()?;

    let answer = pipeline.answer(question, document).await?;
    Ok(if json { output::answer_json(question, &answer) } else { output::answer_human(&answer) })
}

async fn retrieve(config: RagConfig, document: &Path, question: &str, embeddings: bool, json: bool) -> Result<String> {
    let mut builder = RagPipeline::builder().config(config);
    if embeddings {
        builder = builder.embedding_provider(backends::gemini_embedder()?);
    }
    let pipeline = builder.build_retrieval_only()?;

    let retrieved = match pipeline.retrieve_document(question, document).await? {
        RetrieveOutcome::Skipped(answer) => return Ok(answer.to_string()),
        RetrieveOutcome::Retrieved(retrieved) => retrieved,
    };
    Ok(if json {
        output::retrieval_json(question.trim(), &retrieved.retrieval)
    } else {
        output::retrieval_human(&retrieved.retrieval, &retrieved.context)
    })
}

async fn chunks(config: &RagConfig, document: &Path, preview: usize) -> Result<String> {
    let text = load_text(document).await?;
    let chunks = WordWindowChunker::new(config.chunk_size, config.chunk_overlap)?.split(&text);
    Ok(output::chunks_human(&chunks, preview))
}

async fn load_text(document: &Path) -> Result<String> {
    let loader = DocumentLoader::for_path(document)?;
    let path = document.to_path_buf();
    let loaded = tokio::task::spawn_blocking(move || loader.load(&path))
        .await
        .context("document extraction task panicked")??;
    Ok(loaded.text)
}
