//! Librarian Agent - Loads spreadsheets and builds the chunk index

use std::path::Path;
use std::sync::Arc;

use newsrag_core::{normalize_document, Chunk, DatePolicy, Document, SentenceChunker};
use newsrag_db::ChunkIndex;
use tracing::{debug, info, instrument};

use crate::capability::{DocumentLoader, Embedder};
use crate::loader::load_documents;
use crate::Result;

/// Normalized documents and their chunks, not yet embedded
#[derive(Debug, Clone)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub chunks: Vec<Chunk>,
}

/// Load, normalize and chunk every spreadsheet in `dir` without embedding
#[instrument(skip(loader, chunker))]
pub fn prepare_corpus(
    dir: &Path,
    loader: &dyn DocumentLoader,
    policy: DatePolicy,
    chunker: &SentenceChunker,
) -> Result<Corpus> {
    let documents = load_documents(dir, loader)?
        .into_iter()
        .map(|doc| normalize_document(doc, policy))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = chunker.chunk_documents(&documents, 0);

    info!(
        "Chunked {} documents into {} nodes",
        documents.len(),
        batch.chunks.len()
    );

    Ok(Corpus {
        documents,
        chunks: batch.chunks,
    })
}

/// The Librarian agent handles ingestion: load → normalize → chunk → index
pub struct LibrarianAgent {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
}

impl LibrarianAgent {
    /// Create a new Librarian agent
    pub fn new(loader: Arc<dyn DocumentLoader>, embedder: Arc<dyn Embedder>) -> Self {
        Self { loader, embedder }
    }

    /// Load, normalize and chunk every spreadsheet in `dir`
    pub fn prepare(&self, dir: &Path, policy: DatePolicy, chunker: &SentenceChunker) -> Result<Corpus> {
        prepare_corpus(dir, self.loader.as_ref(), policy, chunker)
    }

    /// Embed every chunk and store it in a fresh in-memory index.
    ///
    /// Any embedding failure aborts the build.
    #[instrument(skip(self, chunks), fields(chunks = chunks.len()))]
    pub async fn build_index(&self, chunks: &[Chunk]) -> Result<ChunkIndex> {
        let index = ChunkIndex::in_memory(self.embedder.dimension()).await?;
        if chunks.is_empty() {
            return Ok(index);
        }

        debug!("Generating embeddings...");
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        index.insert(chunks, embeddings).await?;
        Ok(index)
    }
}
