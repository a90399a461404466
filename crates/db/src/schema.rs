//! SurrealDB schema definitions

use crate::{DbConnection, DbError, Result};
use tracing::info;

/// Embedding dimension of `BAAI/bge-small-en`
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Initialize the database schema
pub async fn initialize_schema(db: &DbConnection) -> Result<()> {
    info!("Initializing index schema...");

    db.query(SCHEMA_DEFINITION)
        .await?
        .check()
        .map_err(|e| DbError::SchemaInit(e.to_string()))?;

    info!("Schema initialized successfully");
    Ok(())
}

const SCHEMA_DEFINITION: &str = r#"
-- One record per chunk, metadata flattened so filters are plain field matches
DEFINE TABLE chunk SCHEMAFULL;
DEFINE FIELD node_id ON chunk TYPE string;
DEFINE FIELD text ON chunk TYPE string;
DEFINE FIELD file_name ON chunk TYPE string;
DEFINE FIELD date_time ON chunk TYPE option<string>;
DEFINE FIELD embedding ON chunk TYPE array<float>;

DEFINE INDEX idx_chunk_node_id ON chunk FIELDS node_id UNIQUE;
DEFINE INDEX idx_chunk_date_time ON chunk FIELDS date_time;
DEFINE INDEX idx_chunk_file_name ON chunk FIELDS file_name;
"#;
