pub mod filter;
pub mod types;

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use filter::{filter_batch, retain_live_events};
pub use types::{GammaEvent, GammaFilters, GammaMarket, OutcomesField};

#[derive(Error, Debug)]
pub enum GammaError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

pub type Result<T> = std::result::Result<T, GammaError>;

/// Gamma Markets API client
pub struct GammaClient {
    base_url: String,
    client: Client,
}

impl GammaClient {
    /// Create new Gamma API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Fetch ALL active markets with pagination
    pub async fn get_all_active_markets(&self) -> Result<Vec<GammaMarket>> {
        let filters = GammaFilters {
            active: Some(true),
            closed: Some(false),
            archived: Some(false),
            ..Default::default()
        };

        self.get_all_markets_with_filters(filters).await
    }

    /// Fetch ALL markets with custom filters and pagination
    pub async fn get_all_markets_with_filters(
        &self,
        filters: GammaFilters,
    ) -> Result<Vec<GammaMarket>> {
        let mut all_markets = Vec::new();
        let mut offset = 0;
        const LIMIT: usize = 100; // Max per Gamma API spec

        info!("Starting paginated market fetch");

        loop {
            debug!("Fetching page: offset={}, limit={}", offset, LIMIT);

            let markets = self.get_markets_page(LIMIT, offset, filters.clone()).await?;

            let count = markets.len();
            debug!("Fetched {} markets in this page", count);

            all_markets.extend(markets);

            // If we got fewer than limit, we've reached the end
            if count < LIMIT {
                debug!("Reached end of pagination (got {} < {})", count, LIMIT);
                break;
            }

            offset += LIMIT;

            // Rate limit protection: 100 req/10s = ~100ms between requests
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        info!("Fetched total of {} markets", all_markets.len());
        Ok(all_markets)
    }

    /// Fetch single page of markets
    pub async fn get_markets_page(
        &self,
        limit: usize,
        offset: usize,
        filters: GammaFilters,
    ) -> Result<Vec<GammaMarket>> {
        let url = format!("{}/markets", self.base_url);

        let mut params = filters.to_query_params();
        params.push(("limit".to_string(), limit.to_string()));
        params.push(("offset".to_string(), offset.to_string()));
        params.push(("order".to_string(), "id".to_string()));
        params.push(("ascending".to_string(), "false".to_string()));

        debug!("GET {} with {} params", url, params.len());

        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();

        if status == 429 {
            warn!("Gamma API rate limit hit");
            return Err(GammaError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GammaError::ApiError(format!("{}: {}", status, body)));
        }

        let markets = response.json::<Vec<GammaMarket>>().await?;
        Ok(markets)
    }
}
