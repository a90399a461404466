//! One-shot pipeline: load → normalize → chunk → index → retrieve → answer

use std::sync::Arc;
use std::time::{Duration, Instant};

use newsrag_core::{Document, ScoredChunk};
use tracing::{info, instrument};

use crate::answer::AnswerAgent;
use crate::capability::{CompletionModel, DocumentLoader, Embedder};
use crate::config::PipelineConfig;
use crate::librarian::LibrarianAgent;
use crate::search::SearchAgent;
use crate::Result;

/// An indexed corpus ready for retrieval
pub struct IndexedCorpus {
    pub documents: Vec<Document>,
    pub node_count: usize,
    pub search: SearchAgent,
}

/// Everything a full run produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub documents: Vec<Document>,
    pub node_count: usize,
    pub retrieved: Vec<ScoredChunk>,
    pub response: String,
    /// Wall-clock time of retrieval plus the model call
    pub elapsed: Duration,
}

/// Load, normalize, chunk and embed every spreadsheet in the configured directory
#[instrument(skip_all, fields(source_dir = %config.source_dir.display()))]
pub async fn build_index(
    config: &PipelineConfig,
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
) -> Result<IndexedCorpus> {
    let chunker = config.chunker()?;
    let librarian = LibrarianAgent::new(loader, embedder.clone());

    let corpus = librarian.prepare(&config.source_dir, config.date_policy, &chunker)?;
    let index = librarian.build_index(&corpus.chunks).await?;

    Ok(IndexedCorpus {
        documents: corpus.documents,
        node_count: corpus.chunks.len(),
        search: SearchAgent::new(index, embedder),
    })
}

/// Top-K chunks for the configured query and target date
pub async fn retrieve(config: &PipelineConfig, corpus: &IndexedCorpus) -> Result<Vec<ScoredChunk>> {
    corpus
        .search
        .retrieve(&config.query, &config.filter(), config.top_k)
        .await
}

/// Full run. Any stage failure aborts with no partial output.
#[instrument(skip_all, fields(model = %llm.model_name(), target_date = %config.target_date))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn CompletionModel>,
) -> Result<PipelineReport> {
    let corpus = build_index(config, loader, embedder).await?;

    let start = Instant::now();
    let retrieved = retrieve(config, &corpus).await?;
    let response = AnswerAgent::new(llm).answer(&config.query, &retrieved).await?;
    let elapsed = start.elapsed();

    info!(
        "Answered from {} of {} nodes in {:.2}s",
        retrieved.len(),
        corpus.node_count,
        elapsed.as_secs_f64()
    );

    Ok(PipelineReport {
        documents: corpus.documents,
        node_count: corpus.node_count,
        retrieved,
        response,
        elapsed,
    })
}
