//! Transformed market records handed to persistence and formatting

use gamma_feed::GammaMarket;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Output of the transformation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformedMarket {
    /// Pass-through of a single source market
    Binary(BinaryMarket),

    /// Several same-event Yes/No markets merged into one record
    MultiOption(MultiOptionMarket),
}

impl TransformedMarket {
    pub fn id(&self) -> &str {
        match self {
            TransformedMarket::Binary(m) => &m.id,
            TransformedMarket::MultiOption(m) => &m.id,
        }
    }

    /// Question for binaries, synthesized title for multi-option records
    pub fn title(&self) -> &str {
        match self {
            TransformedMarket::Binary(m) => &m.question,
            TransformedMarket::MultiOption(m) => &m.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TransformedMarket::Binary(m) => m.description.as_deref(),
            TransformedMarket::MultiOption(_) => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            TransformedMarket::Binary(m) => m.category.as_deref(),
            TransformedMarket::MultiOption(m) => m.category.as_deref(),
        }
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        let category = Some(category.into());
        match self {
            TransformedMarket::Binary(m) => m.category = category,
            TransformedMarket::MultiOption(m) => m.category = category,
        }
    }

    pub fn is_multi_option(&self) -> bool {
        matches!(self, TransformedMarket::MultiOption(_))
    }

    /// Source ids this record consumes from the raw batch
    pub fn source_ids(&self) -> Vec<&str> {
        match self {
            TransformedMarket::Binary(m) => vec![m.id.as_str()],
            TransformedMarket::MultiOption(m) => {
                m.source_ids.iter().map(String::as_str).collect()
            }
        }
    }
}

/// Essential fields of a source market, passed through unchanged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryMarket {
    pub id: String,
    pub condition_id: Option<String>,
    pub question: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub outcomes: Vec<String>,
    pub expiry_ms: Option<i64>,
    pub category: Option<String>,
}

impl BinaryMarket {
    /// Carry over the essential fields of a raw record
    pub fn from_record(record: &GammaMarket) -> Self {
        Self {
            id: record.id.clone(),
            condition_id: record.condition_id.clone(),
            question: record.question.clone(),
            description: record.description.clone(),
            image: record.image.clone(),
            icon: record.icon.clone(),
            outcomes: record.outcome_list().unwrap_or_default(),
            expiry_ms: record.expiry_ms(),
            category: record.category.clone(),
        }
    }
}

/// Synthetic record for one event with several outcome entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiOptionMarket {
    /// Deterministic id derived from the grouping key, `group_` prefixed
    pub id: String,

    pub title: String,

    /// Outcome entities, first-seen order, no duplicates
    pub options: Vec<String>,

    /// Image per option. Every option has a key here; `None` means no
    /// dedicated image could be resolved; callers must not substitute the
    /// banner.
    pub option_images: HashMap<String, Option<String>>,

    /// Shared event banner, distinct from any single option's image
    pub banner_image: Option<String>,
    pub banner_icon: Option<String>,

    /// Ids of the source markets merged into this record, original order
    pub source_ids: Vec<String>,

    pub expiry_ms: Option<i64>,
    pub category: Option<String>,
}

impl MultiOptionMarket {
    /// Resolved image for one option, if any
    pub fn option_image(&self, option: &str) -> Option<&str> {
        self.option_images
            .get(option)
            .and_then(|image| image.as_deref())
    }

    /// True when every option holds a key in the image map
    pub fn image_map_is_total(&self) -> bool {
        self.options
            .iter()
            .all(|option| self.option_images.contains_key(option))
    }
}
