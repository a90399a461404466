//! Pipeline configuration

use std::path::PathBuf;

use newsrag_core::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use newsrag_core::{canonical_date, DatePolicy, QueryFilter, SentenceChunker};

use crate::llm::DEFAULT_MODEL;
use crate::loader::DEFAULT_COLUMN;
use crate::{AgentError, Result};

pub const DEFAULT_SOURCE_DIR: &str = "./srcDataV1";
pub const DEFAULT_TARGET_DATE: &str = "2023-11-13";
pub const DEFAULT_TOP_K: usize = 3;

/// The macroeconomic report request sent with every run
pub const DEFAULT_QUERY: &str = concat!(
    "Please answer with traditional Chinese. (ZH)",
    "Please organize the above text from an economic and political macro perspective and output it in the form of a paper.",
    "Please help me deduce from all important dependencies, explain it, and make it relatively correct.",
    "Please give as \"1. Stocks or real estate:, 2. commodities:, 3. Dollar or Short-term bonds:, 4. Long-term bonds:\".",
    "Please add interesting questions for readers and provide answers.",
    "Please include some economic formulas to support the viewpoints.",
);

/// Every knob of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub source_dir: PathBuf,
    pub column: String,
    pub target_date: String,
    pub query: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub model: String,
    pub date_policy: DatePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            column: DEFAULT_COLUMN.to_string(),
            target_date: DEFAULT_TARGET_DATE.to_string(),
            query: DEFAULT_QUERY.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            model: DEFAULT_MODEL.to_string(),
            date_policy: DatePolicy::Strict,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Retrieval filter for the target date
    pub fn filter(&self) -> QueryFilter {
        QueryFilter::date(self.target_date.clone())
    }

    pub fn chunker(&self) -> Result<SentenceChunker> {
        Ok(SentenceChunker::new(self.chunk_size, self.chunk_overlap)?)
    }
}

/// Builder producing a validated [`PipelineConfig`]
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.config.column = column.into();
        self
    }

    pub fn target_date(mut self, date: impl Into<String>) -> Self {
        self.config.target_date = date.into();
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.config.query = query.into();
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn date_policy(mut self, policy: DatePolicy) -> Self {
        self.config.date_policy = policy;
        self
    }

    /// Validate and build.
    ///
    /// Fails when `chunk_size` is zero, `chunk_overlap >= chunk_size`,
    /// `top_k` is zero, the target date is not `YYYY-MM-DD`, or the query
    /// or column is blank. The target date is stored zero-padded.
    pub fn build(self) -> Result<PipelineConfig> {
        let mut config = self.config;
        config.chunker()?;
        config.target_date = canonical_date(config.target_date.trim()).map_err(|e| {
            AgentError::Config(format!(
                "target date {:?} is not YYYY-MM-DD: {e}",
                config.target_date
            ))
        })?;
        if config.top_k == 0 {
            return Err(AgentError::Config("top_k must be greater than zero".into()));
        }
        if config.query.trim().is_empty() {
            return Err(AgentError::Config("query cannot be empty".into()));
        }
        if config.column.trim().is_empty() {
            return Err(AgentError::Config("column cannot be empty".into()));
        }
        Ok(config)
    }
}
