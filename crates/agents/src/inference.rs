//! Embedding client for a local embedding server (TEI or Ollama).

use crate::capability::Embedder;
use crate::{AgentError, Result};
use async_trait::async_trait;
use newsrag_db::schema::DEFAULT_EMBEDDING_DIMENSION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_TEI_URL: &str = "http://localhost:8081";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_PROVIDER: &str = "tei";
const DEFAULT_OLLAMA_EMBED_MODEL: &str = "bge-small-en";
const DEFAULT_MAX_BATCH: usize = 32;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TRUNCATE: bool = true;
/// Query instruction recommended for the English BGE models
pub const BGE_QUERY_INSTRUCTION: &str = "Represent this question for searching relevant passages: ";

pub(crate) fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|value| {
            let value = value.trim().to_ascii_lowercase();
            matches!(value.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(default)
}

pub(crate) fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedProvider {
    Tei,
    Ollama,
}

/// HTTP client for the embedding server
#[derive(Clone)]
pub struct TeiClient {
    client: Client,
    base_url: String,
    provider: EmbedProvider,
    model: String,
    dimension: usize,
    max_batch: usize,
    truncate: bool,
    timeout: Duration,
    query_instruction: Option<String>,
}

impl TeiClient {
    /// TEI client with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            provider: EmbedProvider::Tei,
            model: DEFAULT_OLLAMA_EMBED_MODEL.to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            max_batch: DEFAULT_MAX_BATCH,
            truncate: DEFAULT_TRUNCATE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            query_instruction: Some(BGE_QUERY_INSTRUCTION.to_string()),
        }
    }

    /// Ollama client for `model`
    pub fn ollama(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: EmbedProvider::Ollama,
            model: model.into(),
            ..Self::new(base_url)
        }
    }

    /// Client configured from `EMBED_*` environment variables
    pub fn default_local() -> Self {
        let provider = env_or_default("EMBED_PROVIDER", DEFAULT_PROVIDER);
        let client = if provider.eq_ignore_ascii_case("ollama") {
            let url = env_or_default("EMBED_URL", DEFAULT_OLLAMA_URL);
            let model = env_or_default("EMBED_MODEL", DEFAULT_OLLAMA_EMBED_MODEL);
            Self::ollama(url, model)
        } else {
            Self::new(env_or_default("EMBED_URL", DEFAULT_TEI_URL))
        };

        let query_instruction = match std::env::var("EMBED_QUERY_INSTRUCTION") {
            Ok(value) if value.trim().is_empty() || value.eq_ignore_ascii_case("none") => None,
            Ok(value) => Some(value),
            Err(_) => client.query_instruction.clone(),
        };

        client
            .with_dimension(env_usize("EMBED_DIMENSION", DEFAULT_EMBEDDING_DIMENSION))
            .with_max_batch(env_usize("EMBED_MAX_BATCH", DEFAULT_MAX_BATCH))
            .with_truncate(env_flag("EMBED_TRUNCATE", DEFAULT_TRUNCATE))
            .with_timeout(Duration::from_secs(
                env_usize("EMBED_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS as usize) as u64,
            ))
            .with_query_instruction(query_instruction)
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(1);
        self
    }

    /// Let the server truncate inputs longer than the model's window
    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prefix applied to retrieval queries (not to passages)
    pub fn with_query_instruction(mut self, instruction: Option<String>) -> Self {
        self.query_instruction = instruction;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn provider(&self) -> EmbedProvider {
        self.provider
    }

    pub async fn health(&self) -> Result<bool> {
        let url = match self.provider {
            EmbedProvider::Tei => format!("{}/health", self.base_url),
            EmbedProvider::Ollama => format!("{}/api/tags", self.base_url),
        };
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        Ok(response.status().is_success())
    }

    /// Embed without checking the dimension (used to probe a server)
    pub async fn embed_unchecked(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            EmbedProvider::Ollama => self.ollama_embed(text).await,
            EmbedProvider::Tei => {
                let url = format!("{}/embed", self.base_url);
                let request = TeiEmbedRequest {
                    inputs: text,
                    truncate: self.truncate,
                };

                let response = self
                    .client
                    .post(&url)
                    .json(&request)
                    .timeout(self.timeout)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<Value>()
                    .await?;

                parse_embedding_response(response)
            }
        }
    }

    fn validate(&self, embedding: Vec<f32>) -> Result<Vec<f32>> {
        validate_embedding_dim(embedding.len(), self.dimension)?;
        Ok(embedding)
    }

    async fn ollama_embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = OllamaEmbedRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json::<OllamaEmbedResponse>()
            .await?;

        Ok(response.embedding)
    }
}

#[async_trait]
impl Embedder for TeiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.embed_unchecked(text).await?;
        self.validate(embedding)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        match &self.query_instruction {
            Some(instruction) => self.embed(&format!("{instruction}{text}")).await,
            None => self.embed(text).await,
        }
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        if matches!(self.provider, EmbedProvider::Ollama) {
            let mut results = Vec::with_capacity(texts.len());
            for text in texts {
                results.push(self.embed(text).await?);
            }
            return Ok(results);
        }

        let url = format!("{}/embed", self.base_url);
        let mut results = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.max_batch) {
            debug!("Requesting embeddings for {} texts", batch.len());
            let request = TeiEmbedBatchRequest {
                inputs: batch,
                truncate: self.truncate,
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .timeout(self.timeout)
                .send()
                .await?
                .error_for_status()?
                .json::<Value>()
                .await?;

            let embeddings = parse_embeddings_response(response)?;
            if embeddings.len() != batch.len() {
                return Err(AgentError::Embedding(format!(
                    "requested {} embeddings, received {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            for embedding in embeddings {
                results.push(self.validate(embedding)?);
            }
        }

        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn validate_embedding_dim(len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(AgentError::Embedding(format!(
            "Embedding dimension {} does not match expected {}. Set EMBED_DIMENSION to match the served model.",
            len, expected
        )));
    }
    Ok(())
}

#[derive(Serialize)]
struct TeiEmbedRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

#[derive(Serialize)]
struct TeiEmbedBatchRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

fn parse_embedding_response(value: Value) -> Result<Vec<f32>> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(Vec::new());
            }
            if items.first().map(|v| v.is_number()).unwrap_or(false) {
                serde_json::from_value(Value::Array(items)).map_err(|e| {
                    AgentError::Embedding(format!("Invalid TEI embedding array: {}", e))
                })
            } else {
                let first = items
                    .into_iter()
                    .next()
                    .ok_or_else(|| AgentError::Embedding("Missing embeddings".to_string()))?;
                serde_json::from_value(first).map_err(|e| {
                    AgentError::Embedding(format!("Invalid TEI embedding array: {}", e))
                })
            }
        }
        other => Err(AgentError::Embedding(format!(
            "Unexpected TEI response format: {}",
            other
        ))),
    }
}

fn parse_embeddings_response(value: Value) -> Result<Vec<Vec<f32>>> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Ok(Vec::new());
            }
            if items.first().map(|v| v.is_array()).unwrap_or(false) {
                serde_json::from_value(Value::Array(items)).map_err(|e| {
                    AgentError::Embedding(format!("Invalid TEI embeddings response: {}", e))
                })
            } else {
                let single: Vec<f32> = serde_json::from_value(Value::Array(items)).map_err(|e| {
                    AgentError::Embedding(format!("Invalid TEI embedding array: {}", e))
                })?;
                Ok(vec![single])
            }
        }
        other => Err(AgentError::Embedding(format!(
            "Unexpected TEI response format: {}",
            other
        ))),
    }
}
