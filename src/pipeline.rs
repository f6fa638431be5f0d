//! Batch ingest pipeline
//!
//! One run: fetch raw markets, strip dead event refs, transform against a
//! ledger snapshot, categorize, queue for approval, commit the ledger.
//! Per-record anomalies degrade; only infrastructure failures (API,
//! database) abort a run.

use crate::categorize::Categorizer;
use gamma_feed::{filter_batch, GammaClient, GammaError, GammaMarket};
use market_db::{IngestStore, StoreError};
use market_transformer::{MarketTransformer, TransformedMarket};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] GammaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunStats {
    pub fetched: usize,
    pub transformed: usize,
    pub multi_option: usize,
    pub queued: usize,
    pub needs_manual: usize,
    pub duration: Duration,
}

/// Orchestrates one fetch-transform-queue cycle
pub struct PipelineRunner {
    client: GammaClient,
    store: IngestStore,
    transformer: MarketTransformer,
    categorizer: Box<dyn Categorizer + Send + Sync>,
}

impl PipelineRunner {
    pub fn new(
        client: GammaClient,
        store: IngestStore,
        transformer: MarketTransformer,
        categorizer: Box<dyn Categorizer + Send + Sync>,
    ) -> Self {
        Self {
            client,
            store,
            transformer,
            categorizer,
        }
    }

    /// Fetch the active-market batch and run it through the pipeline
    pub async fn run_once(&self) -> Result<RunStats> {
        let raw = self.client.get_all_active_markets().await?;
        self.run_batch(raw).await
    }

    /// Run an already-fetched batch (offline replays, tests)
    pub async fn run_batch(&self, raw: Vec<GammaMarket>) -> Result<RunStats> {
        let start = Instant::now();
        let fetched = raw.len();
        info!("🔄 Pipeline run over {} raw market(s)", fetched);

        let batch = filter_batch(raw);

        let mut ledger = self.store.snapshot_ledger().await?;
        let transformed = self.transformer.transform(&batch, &mut ledger);

        let multi_option = transformed.iter().filter(|m| m.is_multi_option()).count();

        let mut queued = 0;
        let mut needs_manual_count = 0;

        for mut market in transformed.clone() {
            let needs_manual = self.categorize(&mut market).await;
            if needs_manual {
                needs_manual_count += 1;
            }

            self.store.insert_pending(&market, needs_manual).await?;
            queued += 1;
        }

        let committed = self.store.commit_consumed(ledger.fresh()).await?;

        let stats = RunStats {
            fetched,
            transformed: transformed.len(),
            multi_option,
            queued,
            needs_manual: needs_manual_count,
            duration: start.elapsed(),
        };

        info!(
            "✅ Run complete: {} fetched, {} transformed ({} multi-option), {} queued, {} consumed id(s), {:?}",
            stats.fetched, stats.transformed, stats.multi_option, stats.queued, committed, stats.duration
        );

        Ok(stats)
    }

    /// Assign a category in place; returns the needs-manual flag
    ///
    /// A categorizer failure is not fatal: the market keeps whatever
    /// category it carried and is flagged for manual review.
    async fn categorize(&self, market: &mut TransformedMarket) -> bool {
        let result = self
            .categorizer
            .categorize(market.title(), market.description())
            .await;

        match result {
            Ok(categorization) => {
                market.set_category(&categorization.category);
                categorization.needs_manual
            }
            Err(e) => {
                warn!(
                    "Categorizer failed for '{}': {}; flagging for manual review",
                    market.title(),
                    e
                );
                true
            }
        }
    }
}
