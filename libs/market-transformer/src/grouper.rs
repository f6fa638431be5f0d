//! Batch partitioning into same-event groups
//!
//! Key precedence per record: explicit event id, then entity-normalized
//! base question, then the verbatim question (singleton group). Pure
//! content-based bucketing; insertion order is preserved within and across
//! groups.

use crate::extractor::EntityExtractor;
use gamma_feed::GammaMarket;
use std::collections::HashMap;
use tracing::{debug, error};

/// What a group was keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Source-supplied event id
    Event(String),

    /// Question with the entity replaced by a placeholder and normalized
    BaseQuestion(String),

    /// Verbatim question; no event ref and no extractable entity
    Question(String),
}

impl GroupKey {
    /// Deterministic id component for synthesized records
    pub fn slug(&self) -> String {
        match self {
            GroupKey::Event(id) => id.clone(),
            GroupKey::BaseQuestion(text) | GroupKey::Question(text) => slugify(text),
        }
    }
}

/// One group of raw records representing the same underlying event
#[derive(Debug)]
pub struct MarketGroup<'a> {
    pub key: GroupKey,
    pub members: Vec<&'a GammaMarket>,
}

/// Partitions a batch of raw records by underlying event
pub struct EventGrouper<'e> {
    extractor: &'e EntityExtractor,
}

impl<'e> EventGrouper<'e> {
    pub fn new(extractor: &'e EntityExtractor) -> Self {
        Self { extractor }
    }

    /// Group records, preserving insertion order
    ///
    /// Records missing an id or a question are skipped with an error; a
    /// malformed record never aborts the batch.
    pub fn group<'m, I>(&self, records: I) -> Vec<MarketGroup<'m>>
    where
        I: IntoIterator<Item = &'m GammaMarket>,
    {
        let mut groups: Vec<MarketGroup<'m>> = Vec::new();
        let mut index: HashMap<GroupKey, usize> = HashMap::new();

        for record in records {
            if record.id.trim().is_empty() || record.question.trim().is_empty() {
                error!("Skipping malformed record (id={:?})", record.id);
                continue;
            }

            let key = self.key_for(record);
            debug!("Record {} grouped under {:?}", record.id, key);

            match index.get(&key) {
                Some(&slot) => groups[slot].members.push(record),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(MarketGroup {
                        key,
                        members: vec![record],
                    });
                }
            }
        }

        groups
    }

    /// Compute the grouping key for one record
    fn key_for(&self, record: &GammaMarket) -> GroupKey {
        if let Some(event_id) = record
            .event_ref()
            .and_then(|event| event.id.as_deref())
            .filter(|id| !id.trim().is_empty())
        {
            return GroupKey::Event(event_id.to_string());
        }

        if let Some(entity) = self.extractor.extract(&record.question) {
            let base = self.extractor.base_question(&record.question, &entity);
            return GroupKey::BaseQuestion(base);
        }

        GroupKey::Question(record.question.clone())
    }
}

/// Lowercase, alphanumerics kept, everything else collapsed to single dashes
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}
