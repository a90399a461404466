//! Core domain types for newsrag
//!
//! This crate defines the data flowing through the pipeline: source files,
//! documents and their metadata, chunks, and retrieval filters. It also
//! holds the two pure stages, metadata normalization and chunking.

pub mod chunk;
pub mod chunker;
pub mod document;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod source;

pub use chunk::{Chunk, ScoredChunk};
pub use chunker::{ChunkBatch, SentenceChunker};
pub use document::{Document, DocumentMetadata};
pub use error::{CoreError, Result};
pub use filter::{ExactMatch, MetadataKey, QueryFilter};
pub use normalize::{
    canonical_date, normalize_document, strip_markers, DatePolicy, CHAT_TEMPLATE_MARKERS,
};
pub use source::SourceFile;
