//! Chunk types - the atomic units indexed for retrieval

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocumentMetadata;

/// Prefix of every chunk identifier
pub const NODE_ID_PREFIX: &str = "node-";

/// A bounded span of text from one document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// `node-<n>`, unique within a run
    pub id: String,

    /// The chunk text
    pub text: String,

    /// Copied unchanged from the parent document
    pub metadata: DocumentMetadata,
}

impl Chunk {
    /// Create a chunk with the identifier for sequential index `index`
    pub fn new(index: usize, text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: node_id(index),
            text: text.into(),
            metadata,
        }
    }
}

/// Format the identifier for a sequential chunk index
pub fn node_id(index: usize) -> String {
    format!("{NODE_ID_PREFIX}{index}")
}

/// A retrieved chunk and its similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity (higher is more relevant)
    pub score: f32,
}

impl fmt::Display for ScoredChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Node ID: {}", self.chunk.id)?;
        writeln!(
            f,
            "Source: {} ({})",
            self.chunk.metadata.file_name,
            self.chunk.metadata.date_time.as_deref().unwrap_or("no date")
        )?;
        writeln!(f, "Text: {}", self.chunk.text)?;
        write!(f, "Score: {:.3}", self.score)
    }
}
