//! Chunk index - storage and filtered similarity search

use crate::{init_memory, DbConnection, DbError, Result};
use newsrag_core::{Chunk, DocumentMetadata, QueryFilter, ScoredChunk};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// In-memory vector index over chunks
#[derive(Clone)]
pub struct ChunkIndex {
    db: DbConnection,
    dimension: usize,
}

impl ChunkIndex {
    /// Wrap an initialized connection
    pub fn new(db: DbConnection, dimension: usize) -> Self {
        Self { db, dimension }
    }

    /// Fresh in-memory index
    pub async fn in_memory(dimension: usize) -> Result<Self> {
        Ok(Self::new(init_memory().await?, dimension))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Store chunks with their embeddings, paired by position.
    ///
    /// Every vector is checked before anything is written, so a bad batch
    /// leaves the index untouched.
    #[instrument(skip(self, chunks, embeddings))]
    pub async fn insert(&self, chunks: &[Chunk], embeddings: Vec<Vec<f32>>) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(DbError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        for (chunk, embedding) in chunks.iter().zip(&embeddings) {
            if embedding.len() != self.dimension {
                return Err(DbError::DimensionMismatch {
                    id: chunk.id.clone(),
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let record = ChunkRecord {
                node_id: chunk.id.clone(),
                text: chunk.text.clone(),
                file_name: chunk.metadata.file_name.clone(),
                date_time: chunk.metadata.date_time.clone(),
                embedding,
            };

            let created: Option<ChunkRecord> = self.db.create("chunk").content(record).await?;
            created.ok_or_else(|| DbError::CreateFailed(format!("chunk {}", chunk.id)))?;
        }

        info!("Indexed {} chunks", chunks.len());
        Ok(chunks.len())
    }

    /// Number of indexed chunks
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<usize> {
        let rows: Vec<CountRow> = self
            .db
            .query("SELECT count() FROM chunk GROUP ALL")
            .await?
            .take(0)?;

        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }

    /// Top `top_k` chunks by cosine similarity among those matching `filter`.
    ///
    /// Results are ordered by descending score. No match is an empty vec.
    #[instrument(skip(self, embedding))]
    pub async fn search(
        &self,
        embedding: &[f32],
        filter: &QueryFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if embedding.len() != self.dimension {
            return Err(DbError::DimensionMismatch {
                id: "query".into(),
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let sql = search_query(filter);
        debug!("Vector search: {}", sql.trim());

        let mut query = self
            .db
            .query(sql)
            .bind(("embedding", embedding.to_vec()))
            .bind(("limit", top_k));
        for (i, constraint) in filter.filters.iter().enumerate() {
            query = query.bind((format!("f{i}"), constraint.value.clone()));
        }

        let rows: Vec<ScoredRow> = query.await?.take(0)?;

        let mut results: Vec<ScoredChunk> = rows.into_iter().map(ScoredRow::into_scored).collect();
        // Guard against engine-side ordering quirks
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        Ok(results)
    }
}

/// Build the SurrealQL for a filtered similarity search.
///
/// Field names come from `MetadataKey`, values are bound as `$f<i>`.
fn search_query(filter: &QueryFilter) -> String {
    let where_clause = if filter.is_empty() {
        String::new()
    } else {
        let conditions: Vec<String> = filter
            .filters
            .iter()
            .enumerate()
            .map(|(i, constraint)| format!("{} = $f{i}", constraint.key.as_str()))
            .collect();
        format!("WHERE {}", conditions.join(" AND "))
    };

    format!(
        r#"
            SELECT
                node_id,
                text,
                file_name,
                date_time,
                vector::similarity::cosine(embedding, $embedding) AS score
            FROM chunk
            {where_clause}
            ORDER BY score DESC
            LIMIT $limit
        "#
    )
}

// ==========================================
// RECORD TYPES
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkRecord {
    node_id: String,
    text: String,
    file_name: String,
    date_time: Option<String>,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ScoredRow {
    node_id: String,
    text: String,
    file_name: String,
    #[serde(default)]
    date_time: Option<String>,
    score: f64,
}

impl ScoredRow {
    fn into_scored(self) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: self.node_id,
                text: self.text,
                metadata: DocumentMetadata::new(self.file_name, self.date_time),
            },
            score: self.score as f32,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: usize,
}
