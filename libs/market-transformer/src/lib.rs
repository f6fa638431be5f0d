//! Market transformation engine
//!
//! Turns a batch of raw Polymarket listings into transformed records,
//! merging groups of near-duplicate Yes/No questions about one event into a
//! single multi-option market with a dedicated image per option.
//!
//! The engine is a pure batch transform: no I/O, no suspension points, no
//! state beyond the injected dedup ledger. Flow per call:
//! ledger filter -> group -> synthesize -> resolve images -> mark consumed.

pub mod extractor;
pub mod grouper;
pub mod images;
pub mod ledger;
pub mod model;
pub mod patterns;
pub mod synthesizer;

use gamma_feed::GammaMarket;
use tracing::{debug, info};

pub use extractor::EntityExtractor;
pub use grouper::{EventGrouper, GroupKey, MarketGroup};
pub use images::ImageResolver;
pub use ledger::{DedupLedger, MemoryLedger};
pub use model::{BinaryMarket, MultiOptionMarket, TransformedMarket};
pub use patterns::{PatternConfig, PatternError, PatternRule, PatternSet};
pub use synthesizer::{GroupOutput, MultiOptionSynthesizer};

/// The transformation engine
pub struct MarketTransformer {
    extractor: EntityExtractor,
}

impl MarketTransformer {
    /// Engine with the built-in pattern table
    pub fn new() -> Self {
        Self {
            extractor: EntityExtractor::default(),
        }
    }

    /// Engine with a custom pattern table (config-extended deployments)
    pub fn with_patterns(patterns: PatternSet) -> Self {
        Self {
            extractor: EntityExtractor::new(patterns),
        }
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Transform one batch
    ///
    /// Records whose id the ledger already contains are dropped up front, so
    /// repeated runs over overlapping batches are idempotent. Every id that
    /// ends up in the output, merged or passed through, is marked consumed.
    /// The full batch (including already-consumed records) still serves as
    /// the search space for option images.
    pub fn transform(
        &self,
        records: &[GammaMarket],
        ledger: &mut dyn DedupLedger,
    ) -> Vec<TransformedMarket> {
        let fresh: Vec<&GammaMarket> = records
            .iter()
            .filter(|record| !ledger.contains(&record.id))
            .collect();

        let skipped = records.len() - fresh.len();
        if skipped > 0 {
            debug!("Skipping {} already-consumed record(s)", skipped);
        }

        let grouper = EventGrouper::new(&self.extractor);
        let synthesizer = MultiOptionSynthesizer::new(&self.extractor);

        let groups = grouper.group(fresh);
        debug!("Partitioned {} fresh record(s) into {} group(s)", records.len() - skipped, groups.len());

        let mut output = Vec::new();
        let mut merged_groups = 0;

        for group in &groups {
            match synthesizer.synthesize(group) {
                GroupOutput::Binaries(binaries) => {
                    for binary in binaries {
                        ledger.add(&binary.id);
                        output.push(TransformedMarket::Binary(binary));
                    }
                }
                GroupOutput::Multi(mut multi) => {
                    ImageResolver::resolve(&mut multi, &group.members, records);
                    for id in &multi.source_ids {
                        ledger.add(id);
                    }
                    merged_groups += 1;
                    output.push(TransformedMarket::MultiOption(multi));
                }
            }
        }

        info!(
            "Transformed {} record(s) into {} market(s) ({} multi-option)",
            records.len(),
            output.len(),
            merged_groups
        );

        output
    }
}

impl Default for MarketTransformer {
    fn default() -> Self {
        Self::new()
    }
}
