//! Search Agent - Filtered top-K retrieval over the chunk index

use std::sync::Arc;

use newsrag_core::{QueryFilter, ScoredChunk};
use newsrag_db::ChunkIndex;
use tracing::{debug, info, instrument};

use crate::capability::Embedder;
use crate::Result;

/// The Search agent embeds a query and ranks indexed chunks against it
pub struct SearchAgent {
    index: ChunkIndex,
    embedder: Arc<dyn Embedder>,
}

impl SearchAgent {
    /// Create a new Search agent
    pub fn new(index: ChunkIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    /// Up to `top_k` chunks satisfying `filter`, most similar first.
    ///
    /// Chunks whose metadata lacks a filtered key never match.
    #[instrument(skip(self, query), fields(query_chars = query.len()))]
    pub async fn retrieve(
        &self,
        query: &str,
        filter: &QueryFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        debug!("Generating query embedding...");
        let embedding = self.embedder.embed_query(query).await?;

        let results = self.index.search(&embedding, filter, top_k).await?;
        info!("Retrieved {} chunks", results.len());

        Ok(results)
    }
}
