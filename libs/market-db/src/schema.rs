//! Database schema initialization

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to initialize schema: {0}")]
    InitError(#[from] sqlx::Error),
}

/// Consumed source-record ids; the durable half of the dedup ledger
const CREATE_PROCESSED_MARKETS: &str = r#"
CREATE TABLE IF NOT EXISTS processed_markets (
    id TEXT PRIMARY KEY,
    consumed_at TEXT NOT NULL
)
"#;

/// Transformed records waiting for the approval workflow
const CREATE_PENDING_MARKETS: &str = r#"
CREATE TABLE IF NOT EXISTS pending_markets (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    market_type TEXT NOT NULL,
    category TEXT,
    needs_manual INTEGER NOT NULL DEFAULT 0,
    payload TEXT NOT NULL,
    posted INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
"#;

const CREATE_PENDING_POSTED_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_pending_markets_posted
ON pending_markets (posted)
"#;

/// Create all tables and indexes if missing
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), SchemaError> {
    sqlx::query(CREATE_PROCESSED_MARKETS).execute(pool).await?;
    sqlx::query(CREATE_PENDING_MARKETS).execute(pool).await?;
    sqlx::query(CREATE_PENDING_POSTED_INDEX).execute(pool).await?;

    debug!("Schema initialized");
    Ok(())
}
