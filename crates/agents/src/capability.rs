//! Capability interfaces the pipeline is assembled from
//!
//! The pipeline only depends on these three traits; concrete backends
//! (spreadsheets, TEI/Ollama, OpenAI) are injected by the caller.

use std::path::Path;

use async_trait::async_trait;

use crate::Result;

/// Produces raw text from a file
pub trait DocumentLoader: Send + Sync {
    /// Whether this loader handles `path` at all (used for directory listing)
    fn accepts(&self, path: &Path) -> bool;

    /// Extract the text of one file
    fn load_text(&self, path: &Path) -> Result<String>;
}

/// Produces a vector from text
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a passage
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a retrieval query. Defaults to [`Embedder::embed`].
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text).await
    }

    /// Embed passages in order. The default calls [`Embedder::embed`] sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;
}

/// Produces a completion from a prompt
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}
