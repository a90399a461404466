//! News RAG CLI
//!
//! Answers one question over a directory of dated spreadsheets.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use newsrag_agents::config::{DEFAULT_QUERY, DEFAULT_SOURCE_DIR, DEFAULT_TARGET_DATE, DEFAULT_TOP_K};
use newsrag_agents::llm::DEFAULT_MODEL;
use newsrag_agents::loader::DEFAULT_COLUMN;
use newsrag_agents::{
    build_index, prepare_corpus, retrieve, run_pipeline, Embedder, ExcelColumnLoader, OpenAiClient,
    PipelineConfig, TeiClient,
};
use newsrag_core::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use newsrag_core::DatePolicy;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// News RAG - Ask an LLM about one day of news spreadsheets
#[derive(Parser)]
#[command(name = "newsrag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Defaults to `ask`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct PipelineArgs {
    /// Directory of spreadsheets named <prefix>_<YYYY-MM-DD>_<...>
    #[arg(long, global = true, default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// Only chunks from documents with this date are retrieved
    #[arg(long, global = true, default_value = DEFAULT_TARGET_DATE)]
    date: String,

    /// Question sent to the model
    #[arg(short, long, global = true, default_value = DEFAULT_QUERY, hide_default_value = true)]
    query: String,

    /// Spreadsheet column holding the text
    #[arg(long, global = true, default_value = DEFAULT_COLUMN)]
    column: String,

    /// Maximum chunk length in characters
    #[arg(long, global = true, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, global = true, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Number of chunks retrieved
    #[arg(short = 'k', long, global = true, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Chat model
    #[arg(long, global = true, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Keep files whose names carry no valid date instead of failing
    #[arg(long, global = true)]
    lenient_dates: bool,
}

impl PipelineArgs {
    fn config(&self) -> Result<PipelineConfig> {
        let policy = if self.lenient_dates {
            DatePolicy::Lenient
        } else {
            DatePolicy::Strict
        };

        PipelineConfig::builder()
            .source_dir(&self.source_dir)
            .target_date(&self.date)
            .query(&self.query)
            .column(&self.column)
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .model(&self.model)
            .date_policy(policy)
            .build()
            .context("Invalid pipeline arguments")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index, retrieve and ask the model (default)
    Ask,

    /// Build the index and print the retrieved chunks only
    Retrieve,

    /// Load, normalize and chunk; print per-document metadata
    Inspect,

    /// Show the embedding dimension from the active embeddings provider
    EmbeddingDim {
        /// Optional text to embed (defaults to "dimension probe")
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.pipeline.config()?;

    match cli.command.unwrap_or(Commands::Ask) {
        Commands::Ask => cmd_ask(config).await?,
        Commands::Retrieve => cmd_retrieve(config).await?,
        Commands::Inspect => cmd_inspect(config)?,
        Commands::EmbeddingDim { text } => cmd_embedding_dim(text).await?,
    }

    Ok(())
}

/// Embedding client from the environment, failing early if it is unreachable
async fn connect_embedder() -> Result<TeiClient> {
    let tei = TeiClient::default_local();
    let tei_ok = tei.health().await.unwrap_or(false);
    if !tei_ok {
        eprintln!("Error: embeddings service is not reachable.");
        eprintln!("  Embeddings ({:?}): {}", tei.provider(), tei.base_url());
        anyhow::bail!("Embeddings service unavailable");
    }
    Ok(tei)
}

async fn cmd_ask(config: PipelineConfig) -> Result<()> {
    // The key is checked before any file is read
    let llm = OpenAiClient::from_env(&config.model).context("Cannot create the OpenAI client")?;
    let embedder = connect_embedder().await?;

    info!("Asking {} about {}", config.model, config.target_date);
    let report = run_pipeline(
        &config,
        Arc::new(ExcelColumnLoader::new(&config.column)),
        Arc::new(embedder),
        Arc::new(llm),
    )
    .await
    .with_context(|| format!("Pipeline failed for {}", config.source_dir.display()))?;

    if let Some(first) = report.documents.first() {
        println!("{first}");
    }
    println!("Base Node Num: {}", report.node_count);

    println!("\nRetrieved {} chunks for {}:", report.retrieved.len(), config.target_date);
    for scored in &report.retrieved {
        println!("{scored}\n");
    }

    println!("Response:\n{}", report.response);
    println!("Elapsed Time: {:.2}", report.elapsed.as_secs_f64());

    Ok(())
}

async fn cmd_retrieve(config: PipelineConfig) -> Result<()> {
    let embedder = connect_embedder().await?;

    let corpus = build_index(
        &config,
        Arc::new(ExcelColumnLoader::new(&config.column)),
        Arc::new(embedder),
    )
    .await
    .with_context(|| format!("Failed to index {}", config.source_dir.display()))?;
    let results = retrieve(&config, &corpus).await?;

    println!("Base Node Num: {}", corpus.node_count);
    if results.is_empty() {
        println!("No chunks dated {}.", config.target_date);
        return Ok(());
    }

    println!("\nFound {} chunks:\n", results.len());
    for (i, scored) in results.iter().enumerate() {
        println!("{}. {scored}\n", i + 1);
    }

    Ok(())
}

fn cmd_inspect(config: PipelineConfig) -> Result<()> {
    let chunker = config.chunker()?;
    let loader = ExcelColumnLoader::new(&config.column);

    let corpus = prepare_corpus(&config.source_dir, &loader, config.date_policy, &chunker)
        .with_context(|| format!("Failed to read {}", config.source_dir.display()))?;

    println!("Documents: {}", corpus.documents.len());
    for doc in &corpus.documents {
        let chunks = corpus
            .chunks
            .iter()
            .filter(|chunk| chunk.metadata.file_name == doc.metadata.file_name)
            .count();
        println!(
            "  {} | date_time: {} | {} chars | {} chunks",
            doc.metadata.file_name,
            doc.metadata.date_time.as_deref().unwrap_or("(none)"),
            doc.char_count(),
            chunks
        );
    }
    println!("Base Node Num: {}", corpus.chunks.len());

    Ok(())
}

async fn cmd_embedding_dim(text: Option<String>) -> Result<()> {
    let tei = connect_embedder().await?;

    let probe = text.unwrap_or_else(|| "dimension probe".to_string());
    let embedding = tei.embed_unchecked(&probe).await?;
    println!("Embedding dimension: {}", embedding.len());
    if embedding.len() != tei.dimension() {
        println!(
            "Warning: EMBED_DIMENSION is {}; set it to {} for this model",
            tei.dimension(),
            embedding.len()
        );
    }

    Ok(())
}
