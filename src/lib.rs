//! Market Ingest Bot - Main Library
//!
//! Ingests raw Polymarket listings, merges same-event Yes/No markets into
//! multi-option records with per-option images, and queues the results for
//! the approval workflow.
//!
//! ## Architecture
//!
//! - **gamma-feed**: input boundary: API types, outcome normalization,
//!   event pre-filter, paginated fetch client (re-exported from workspace)
//! - **market-transformer**: the pure transformation engine (re-exported
//!   from workspace)
//! - **market-db**: dedup ledger store and pending-market queue
//!   (re-exported from workspace)
//! - **categorize / pipeline / config**: collaborators and orchestration
//!   for the binaries

// Re-export workspace libraries for convenience
pub use gamma_feed;
pub use market_db;
pub use market_transformer;

pub mod categorize;
pub mod config;
pub mod logging;
pub mod pipeline;

pub use categorize::{Categorization, Categorizer, KeywordCategorizer};
pub use config::{config_path_from_env, PipelineConfig};
pub use pipeline::{PipelineRunner, RunStats};
