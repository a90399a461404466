//! Vector index for newsrag
//!
//! Chunks and their embeddings live in an in-memory SurrealDB instance that
//! is rebuilt from scratch on every run.

pub mod error;
pub mod index;
pub mod schema;

pub use error::{DbError, Result};
pub use index::ChunkIndex;

use surrealdb::engine::local::{Db, Mem};
use surrealdb::Surreal;

/// Database connection type
pub type DbConnection = Surreal<Db>;

/// Initialize an in-memory database
pub async fn init_memory() -> Result<DbConnection> {
    let db = Surreal::new::<Mem>(()).await?;
    setup_database(&db).await?;
    Ok(db)
}

/// Setup database namespace, database, and schema
async fn setup_database(db: &DbConnection) -> Result<()> {
    db.use_ns("newsrag").use_db("index").await?;
    schema::initialize_schema(db).await?;
    Ok(())
}
