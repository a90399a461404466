//! Agent error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Core error: {0}")]
    Core(#[from] newsrag_core::CoreError),

    #[error("Index error: {0}")]
    Index(#[from] newsrag_db::DbError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error in {path}: {message}")]
    Spreadsheet { path: String, message: String },

    #[error("Column {column:?} not found in {path}")]
    MissingColumn { path: String, column: String },

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
