//! Multi-option synthesis
//!
//! A group merges only when it is uniform: every member is a plain Yes/No
//! market. One undecodable or richer outcome set disqualifies the whole
//! group, which then degrades to independent binary records. The
//! conservative output is always safe.

use crate::extractor::EntityExtractor;
use crate::grouper::MarketGroup;
use crate::model::{BinaryMarket, MultiOptionMarket};
use gamma_feed::GammaMarket;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static RE_TITLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^will\s+.+?\s+(?:be|win)\s+").unwrap());

/// Result of synthesizing one group
#[derive(Debug)]
pub enum GroupOutput {
    /// Pass-through records, one per member
    Binaries(Vec<BinaryMarket>),

    /// The group merged into one multi-option record
    Multi(MultiOptionMarket),
}

/// Merges uniform groups into multi-option records
pub struct MultiOptionSynthesizer<'e> {
    extractor: &'e EntityExtractor,
}

impl<'e> MultiOptionSynthesizer<'e> {
    pub fn new(extractor: &'e EntityExtractor) -> Self {
        Self { extractor }
    }

    /// Synthesize one group
    pub fn synthesize(&self, group: &MarketGroup<'_>) -> GroupOutput {
        if group.members.len() == 1 {
            return GroupOutput::Binaries(vec![BinaryMarket::from_record(group.members[0])]);
        }

        if !self.is_uniform(group) {
            return GroupOutput::Binaries(
                group.members.iter().map(|m| BinaryMarket::from_record(m)).collect(),
            );
        }

        GroupOutput::Multi(self.merge(group))
    }

    /// Every member must decode to exactly the two-element set {Yes, No}
    fn is_uniform(&self, group: &MarketGroup<'_>) -> bool {
        for member in &group.members {
            match member.outcome_list() {
                Some(outcomes) if is_yes_no(&outcomes) => {}
                Some(outcomes) => {
                    debug!(
                        "Group {:?} not uniform: market {} has outcomes {:?}",
                        group.key, member.id, outcomes
                    );
                    return false;
                }
                None => {
                    warn!(
                        "Group {:?} not merged: market {} has undecodable outcomes",
                        group.key, member.id
                    );
                    return false;
                }
            }
        }
        true
    }

    fn merge(&self, group: &MarketGroup<'_>) -> MultiOptionMarket {
        let members = &group.members;

        let title = self.group_title(members);

        // Options in first-seen order, deduplicated by exact label
        let mut options: Vec<String> = Vec::new();
        for member in members {
            let option = self
                .extractor
                .extract(&member.question)
                .unwrap_or_else(|| fallback_option_label(&member.question));

            if !options.contains(&option) {
                options.push(option);
            }
        }

        // Image map starts total: every option keyed, nothing resolved yet
        let option_images: HashMap<String, Option<String>> =
            options.iter().map(|option| (option.clone(), None)).collect();

        let (banner_image, banner_icon) = banner_for(members);

        let source_ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();

        let expiry_ms = members.iter().filter_map(|m| m.expiry_ms()).max();

        let category = members
            .iter()
            .find_map(|m| m.event_ref().and_then(|e| e.category.clone()))
            .or_else(|| members.iter().find_map(|m| m.category.clone()));

        info!(
            "Merged {} markets into '{}' with {} options",
            members.len(),
            title,
            options.len()
        );

        MultiOptionMarket {
            id: format!("group_{}", group.key.slug()),
            title,
            options,
            option_images,
            banner_image,
            banner_icon,
            source_ids,
            expiry_ms,
            category,
        }
    }

    /// Shared event title, else the representative question with its
    /// entity-specific prefix stripped
    fn group_title(&self, members: &[&GammaMarket]) -> String {
        if let Some(title) = members
            .iter()
            .find_map(|m| m.event_ref().and_then(|e| e.title.as_deref()))
            .filter(|t| !t.trim().is_empty())
        {
            return title.to_string();
        }

        derive_title(&members[0].question)
    }
}

/// "Will X win Y?" -> "Y"
fn derive_title(question: &str) -> String {
    let stripped = RE_TITLE_PREFIX.replace(question, "");
    stripped.trim_end_matches('?').trim().to_string()
}

/// Option label for a member whose entity could not be extracted. The
/// question itself is the only identifier guaranteed distinct per member.
fn fallback_option_label(question: &str) -> String {
    question.trim_end_matches('?').trim().to_string()
}

/// Outcome set equals {Yes, No} exactly, order-insensitive
fn is_yes_no(outcomes: &[String]) -> bool {
    outcomes.len() == 2
        && outcomes.iter().any(|o| o == "Yes")
        && outcomes.iter().any(|o| o == "No")
}

/// Banner image and icon selection
///
/// Prefer the first member (original order) whose event ref carries a
/// non-empty image; an accidentally-empty banner on the first member must
/// not win over a populated one later in the group. Falls back to the
/// first member's own image/icon.
fn banner_for(members: &[&GammaMarket]) -> (Option<String>, Option<String>) {
    let image = members
        .iter()
        .find_map(|m| {
            m.event_ref()
                .and_then(|e| e.image.as_deref())
                .filter(|url| !url.trim().is_empty())
        })
        .map(str::to_string)
        .or_else(|| members[0].image.clone());

    let icon = members
        .iter()
        .find_map(|m| {
            m.event_ref()
                .and_then(|e| e.icon.as_deref())
                .filter(|url| !url.trim().is_empty())
        })
        .map(str::to_string)
        .or_else(|| members[0].icon.clone());

    (image, icon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouper::GroupKey;
    use gamma_feed::{GammaEvent, OutcomesField};

    fn yes_no() -> Option<OutcomesField> {
        Some(OutcomesField::List(vec!["Yes".into(), "No".into()]))
    }

    fn record(id: &str, question: &str) -> GammaMarket {
        GammaMarket {
            id: id.to_string(),
            condition_id: Some(format!("0x{id}")),
            question: question.to_string(),
            description: None,
            slug: None,
            image: Some(format!("https://img/{id}.png")),
            icon: Some(format!("https://icon/{id}.png")),
            outcomes: yes_no(),
            category: None,
            end_date: None,
            active: true,
            closed: false,
            archived: false,
            events: Vec::new(),
        }
    }

    fn with_event(mut record: GammaMarket, title: &str, image: Option<&str>) -> GammaMarket {
        record.events = vec![GammaEvent {
            id: Some("E1".to_string()),
            title: Some(title.to_string()),
            image: image.map(str::to_string),
            icon: image.map(str::to_string),
            category: Some("sports".to_string()),
            active: Some(true),
            closed: Some(false),
            archived: None,
        }];
        record
    }

    fn group<'a>(members: Vec<&'a GammaMarket>) -> MarketGroup<'a> {
        MarketGroup {
            key: GroupKey::Event("E1".to_string()),
            members,
        }
    }

    #[test]
    fn test_singleton_passes_through() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        let a = record("1", "Will Arsenal win the Champions League?");
        let output = synthesizer.synthesize(&group(vec![&a]));

        match output {
            GroupOutput::Binaries(binaries) => {
                assert_eq!(binaries.len(), 1);
                assert_eq!(binaries[0].id, "1");
            }
            GroupOutput::Multi(_) => panic!("singleton must not merge"),
        }
    }

    #[test]
    fn test_uniform_group_merges() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        let a = with_event(
            record("1", "Will Arsenal win the Champions League?"),
            "Champions League Winner 2025",
            Some("https://banner.png"),
        );
        let b = with_event(
            record("2", "Will Barcelona win the Champions League?"),
            "Champions League Winner 2025",
            Some("https://banner.png"),
        );

        let output = synthesizer.synthesize(&group(vec![&a, &b]));

        match output {
            GroupOutput::Multi(multi) => {
                assert_eq!(multi.id, "group_E1");
                assert_eq!(multi.title, "Champions League Winner 2025");
                assert_eq!(multi.options, vec!["Arsenal", "Barcelona"]);
                assert_eq!(multi.source_ids, vec!["1", "2"]);
                assert_eq!(multi.banner_image.as_deref(), Some("https://banner.png"));
                assert_eq!(multi.category.as_deref(), Some("sports"));
                assert!(multi.image_map_is_total());
                // Nothing resolved yet
                assert_eq!(multi.option_image("Arsenal"), None);
            }
            GroupOutput::Binaries(_) => panic!("uniform group must merge"),
        }
    }

    #[test]
    fn test_three_outcome_member_disqualifies_group() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        let a = record("1", "Will Arsenal win the Champions League?");
        let mut b = record("2", "Will Barcelona win the Champions League?");
        b.outcomes = Some(OutcomesField::List(vec![
            "Yes".into(),
            "No".into(),
            "Draw".into(),
        ]));
        let c = record("3", "Will Inter Milan win the Champions League?");

        let output = synthesizer.synthesize(&group(vec![&a, &b, &c]));

        match output {
            GroupOutput::Binaries(binaries) => assert_eq!(binaries.len(), 3),
            GroupOutput::Multi(_) => panic!("non-uniform group must not merge"),
        }
    }

    #[test]
    fn test_undecodable_outcomes_disqualify_group() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        let a = record("1", "Will Arsenal win the Champions League?");
        let mut b = record("2", "Will Barcelona win the Champions League?");
        b.outcomes = Some(OutcomesField::Encoded("{broken".to_string()));

        let output = synthesizer.synthesize(&group(vec![&a, &b]));
        assert!(matches!(output, GroupOutput::Binaries(b) if b.len() == 2));
    }

    #[test]
    fn test_duplicate_entities_deduplicated_in_order() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        let a = record("1", "Will Arsenal win the Champions League?");
        let b = record("2", "Will Barcelona win the Champions League?");
        // Same entity as the first member, e.g. a re-listed market
        let c = record("3", "Will Arsenal win the Champions League?");

        let output = synthesizer.synthesize(&group(vec![&a, &b, &c]));

        match output {
            GroupOutput::Multi(multi) => {
                assert_eq!(multi.options, vec!["Arsenal", "Barcelona"]);
                // All three sources are still consumed
                assert_eq!(multi.source_ids, vec!["1", "2", "3"]);
            }
            GroupOutput::Binaries(_) => panic!("expected merge"),
        }
    }

    #[test]
    fn test_banner_tie_break_skips_empty_event_image() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        // First member's event ref has an accidentally-empty image
        let a = with_event(
            record("1", "Will Arsenal win the Champions League?"),
            "Champions League Winner 2025",
            Some(""),
        );
        let b = with_event(
            record("2", "Will Barcelona win the Champions League?"),
            "Champions League Winner 2025",
            Some("https://banner.png"),
        );

        let output = synthesizer.synthesize(&group(vec![&a, &b]));

        match output {
            GroupOutput::Multi(multi) => {
                assert_eq!(multi.banner_image.as_deref(), Some("https://banner.png"));
            }
            GroupOutput::Binaries(_) => panic!("expected merge"),
        }
    }

    #[test]
    fn test_title_derived_when_no_event_title() {
        let extractor = EntityExtractor::default();
        let synthesizer = MultiOptionSynthesizer::new(&extractor);

        let a = record("1", "Will Arsenal win the Champions League?");
        let b = record("2", "Will Barcelona win the Champions League?");

        let output = synthesizer.synthesize(&MarketGroup {
            key: GroupKey::BaseQuestion("will <entity> win the champions league?".to_string()),
            members: vec![&a, &b],
        });

        match output {
            GroupOutput::Multi(multi) => {
                assert_eq!(multi.title, "the Champions League");
            }
            GroupOutput::Binaries(_) => panic!("expected merge"),
        }
    }

    #[test]
    fn test_derive_title() {
        assert_eq!(
            derive_title("Will Arsenal win the Champions League?"),
            "the Champions League"
        );
        assert_eq!(
            derive_title("Will Salah be the top goalscorer in the EPL?"),
            "the top goalscorer in the EPL"
        );
        // No recognizable prefix: question minus the question mark
        assert_eq!(derive_title("Rate cut in March?"), "Rate cut in March");
    }

    #[test]
    fn test_is_yes_no() {
        let yes_no = vec!["Yes".to_string(), "No".to_string()];
        let no_yes = vec!["No".to_string(), "Yes".to_string()];
        let richer = vec!["Yes".to_string(), "No".to_string(), "Maybe".to_string()];
        let cased = vec!["YES".to_string(), "NO".to_string()];

        assert!(is_yes_no(&yes_no));
        assert!(is_yes_no(&no_yes));
        assert!(!is_yes_no(&richer));
        assert!(!is_yes_no(&cased));
    }
}
