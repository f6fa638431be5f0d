//! Offline transform of a saved API batch
//!
//! Reads a JSON file of raw Gamma markets, runs the transformation engine
//! against a fresh in-memory ledger, and prints the transformed records.
//! Useful for replaying captured API responses while tuning pattern rules.

use anyhow::{bail, Context, Result};
use gamma_feed::{filter_batch, GammaMarket};
use market_ingest_bot::logging::init_tracing;
use market_transformer::{MarketTransformer, MemoryLedger, PatternConfig, PatternSet};

fn main() -> Result<()> {
    init_tracing("warn");

    let mut args = std::env::args().skip(1);
    let input_path = match args.next() {
        Some(path) => path,
        None => bail!("usage: transform_batch <markets.json> [patterns.yaml]"),
    };

    let patterns = match args.next() {
        Some(path) => {
            let config = PatternConfig::load(&path)
                .with_context(|| format!("loading pattern config {path}"))?;
            PatternSet::with_config(&config)?
        }
        None => PatternSet::builtin(),
    };

    let content = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading {input_path}"))?;
    let raw: Vec<GammaMarket> =
        serde_json::from_str(&content).context("input must be a JSON array of markets")?;

    let batch = filter_batch(raw);

    let transformer = MarketTransformer::with_patterns(patterns);
    let mut ledger = MemoryLedger::new();
    let output = transformer.transform(&batch, &mut ledger);

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
