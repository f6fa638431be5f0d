use market_transformer::TransformedMarket;
use serde::{Deserialize, Serialize};

/// Row in the pending-market queue
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingMarket {
    pub id: String,
    pub title: String,
    /// "binary" or "multi_option"
    pub market_type: String,
    pub category: Option<String>,
    pub needs_manual: bool,
    /// Full transformed record as JSON
    pub payload: String,
    pub posted: bool,
    pub created_at: String, // ISO 8601
}

impl PendingMarket {
    /// Decode the stored transformed record
    pub fn parse_payload(&self) -> Result<TransformedMarket, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }

    pub fn is_multi_option(&self) -> bool {
        self.market_type == "multi_option"
    }
}
