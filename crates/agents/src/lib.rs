//! Agents and service clients for the news RAG pipeline
//!
//! This crate contains the agent implementations:
//! - Librarian: Loads spreadsheets, chunks them and builds the index
//! - Search: Filtered top-K retrieval
//! - Answer: Grounded completion over the retrieved chunks

pub mod answer;
pub mod capability;
pub mod config;
pub mod error;
pub mod inference;
pub mod librarian;
pub mod llm;
pub mod loader;
pub mod pipeline;
pub mod search;

pub use answer::{build_prompt, AnswerAgent};
pub use capability::{CompletionModel, DocumentLoader, Embedder};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{AgentError, Result};
pub use inference::{EmbedProvider, TeiClient};
pub use librarian::{prepare_corpus, Corpus, LibrarianAgent};
pub use llm::OpenAiClient;
pub use loader::{list_source_files, load_documents, ExcelColumnLoader};
pub use pipeline::{build_index, retrieve, run_pipeline, IndexedCorpus, PipelineReport};
pub use search::SearchAgent;
