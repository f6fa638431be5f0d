pub mod ledger;
pub mod models;
pub mod schema;

use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

// Re-export main types
pub use ledger::SnapshotLedger;
pub use models::PendingMarket;
pub use schema::initialize_schema;

use market_transformer::TransformedMarket;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Schema error: {0}")]
    SchemaError(#[from] schema::SchemaError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Pending market not found: {0}")]
    PendingNotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Local store backing the ingest pipeline: the durable dedup ledger and
/// the pending-market queue the approval workflow reads from
pub struct IngestStore {
    pool: SqlitePool,
}

impl IngestStore {
    /// Create new database connection and initialize schema
    pub async fn new(db_path: &str) -> Result<Self> {
        info!("Connecting to database: {}", db_path);

        let options = SqliteConnectOptions::from_str(db_path)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await?;

        schema::initialize_schema(&pool).await?;

        info!("Database initialized successfully");

        Ok(Self { pool })
    }

    // ==================== DEDUP LEDGER ====================

    /// Load the consumed-id set as an in-memory ledger for one run
    pub async fn snapshot_ledger(&self) -> Result<SnapshotLedger> {
        let ids: Vec<(String,)> = sqlx::query_as("SELECT id FROM processed_markets")
            .fetch_all(&self.pool)
            .await?;

        debug!("Ledger snapshot: {} consumed id(s)", ids.len());
        Ok(SnapshotLedger::from_ids(ids.into_iter().map(|(id,)| id)))
    }

    /// Persist ids consumed during a run
    pub async fn commit_consumed(&self, ids: &[String]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let mut committed = 0;

        for id in ids {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO processed_markets (id, consumed_at) VALUES (?, ?)",
            )
            .bind(id)
            .bind(&now)
            .execute(&self.pool)
            .await?;

            committed += result.rows_affected() as usize;
        }

        debug!("Committed {} consumed id(s)", committed);
        Ok(committed)
    }

    // ==================== PENDING MARKETS ====================

    /// Queue a transformed market for approval
    pub async fn insert_pending(
        &self,
        market: &TransformedMarket,
        needs_manual: bool,
    ) -> Result<()> {
        let market_type = if market.is_multi_option() {
            "multi_option"
        } else {
            "binary"
        };
        let payload = serde_json::to_string(market)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO pending_markets (
                id, title, market_type, category, needs_manual, payload, posted, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(market.id())
        .bind(market.title())
        .bind(market_type)
        .bind(market.category())
        .bind(needs_manual)
        .bind(&payload)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Pending markets not yet posted for approval, oldest first
    pub async fn list_unposted(&self) -> Result<Vec<PendingMarket>> {
        let markets = sqlx::query_as::<_, PendingMarket>(
            "SELECT * FROM pending_markets WHERE posted = 0 ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(markets)
    }

    /// Flag a pending market as posted to the approval channel
    pub async fn mark_posted(&self, id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE pending_markets SET posted = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::PendingNotFound(id.to_string()));
        }

        Ok(())
    }

    /// Number of rows in the pending queue
    pub async fn pending_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_markets")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_transformer::BinaryMarket;
    use tempfile::TempDir;

    // An in-memory SQLite URL would give every pooled connection its own
    // database; tests run against a real file instead
    async fn store() -> (IngestStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        (IngestStore::new(&url).await.unwrap(), dir)
    }

    fn binary(id: &str) -> TransformedMarket {
        TransformedMarket::Binary(BinaryMarket {
            id: id.to_string(),
            condition_id: None,
            question: "Will it rain tomorrow?".to_string(),
            description: None,
            image: None,
            icon: None,
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            expiry_ms: None,
            category: Some("weather".to_string()),
        })
    }

    #[tokio::test]
    async fn test_ledger_snapshot_commit_roundtrip() {
        let (store, _dir) = store().await;

        let ledger = store.snapshot_ledger().await.unwrap();
        assert!(ledger.is_empty());

        store
            .commit_consumed(&["1".to_string(), "2".to_string()])
            .await
            .unwrap();

        let ledger = store.snapshot_ledger().await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(market_transformer::DedupLedger::contains(&ledger, "1"));

        // Committing the same ids again is a no-op
        let committed = store
            .commit_consumed(&["2".to_string(), "3".to_string()])
            .await
            .unwrap();
        assert_eq!(committed, 1);
    }

    #[tokio::test]
    async fn test_pending_queue_roundtrip() {
        let (store, _dir) = store().await;

        store.insert_pending(&binary("42"), false).await.unwrap();
        store.insert_pending(&binary("43"), true).await.unwrap();

        let unposted = store.list_unposted().await.unwrap();
        assert_eq!(unposted.len(), 2);
        assert_eq!(unposted[0].id, "42");
        assert!(unposted[1].needs_manual);

        let parsed = unposted[0].parse_payload().unwrap();
        assert_eq!(parsed.id(), "42");

        store.mark_posted("42").await.unwrap();
        let unposted = store.list_unposted().await.unwrap();
        assert_eq!(unposted.len(), 1);
        assert_eq!(unposted[0].id, "43");
    }

    #[tokio::test]
    async fn test_mark_posted_unknown_id_errors() {
        let (store, _dir) = store().await;
        let err = store.mark_posted("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::PendingNotFound(_)));
    }
}
