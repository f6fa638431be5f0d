//! Snapshot-based durable ledger
//!
//! Each pipeline run works against an in-memory snapshot of the
//! `processed_markets` table and records the ids it newly consumed. The
//! snapshot is committed back once the run finishes: single writer per run,
//! no locking inside the transform.

use market_transformer::DedupLedger;
use std::collections::HashSet;

/// Dedup ledger loaded from the store for one transform run
#[derive(Debug, Default)]
pub struct SnapshotLedger {
    seen: HashSet<String>,
    fresh: Vec<String>,
}

impl SnapshotLedger {
    /// Snapshot from previously consumed ids
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seen: ids.into_iter().map(Into::into).collect(),
            fresh: Vec::new(),
        }
    }

    /// Ids consumed during this run, in consumption order
    pub fn fresh(&self) -> &[String] {
        &self.fresh
    }

    /// Total ids known to this snapshot
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl DedupLedger for SnapshotLedger {
    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn add(&mut self, id: &str) {
        if self.seen.insert(id.to_string()) {
            self.fresh.push(id.to_string());
        }
    }
}
