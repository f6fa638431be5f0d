//! Entity extraction from market questions
//!
//! Best-effort: a question no rule recognizes simply yields no entity and
//! the record stays standalone.

use crate::patterns::PatternSet;
use regex::Regex;
use tracing::debug;

/// Placeholder substituted for the entity when building grouping keys
const ENTITY_PLACEHOLDER: &str = "<entity>";

/// Extracts the distinguishing entity (team, person, company) from a
/// question using an ordered pattern table
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    patterns: PatternSet,
}

impl EntityExtractor {
    /// Create an extractor over the given rule table
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// The rule table in use
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Extract the entity from a question, first matching rule wins
    pub fn extract(&self, question: &str) -> Option<String> {
        match self.patterns.first_match(question) {
            Some((rule, entity)) => {
                debug!("Rule '{}' extracted entity '{}' from '{}'", rule, entity, question);
                Some(entity)
            }
            None => {
                debug!("No entity extracted from '{}'", question);
                None
            }
        }
    }

    /// Reduce a question to its entity-independent form
    ///
    /// "Will Arsenal win the Champions League?" and "Will Barcelona win the
    /// Champions League?" both become
    /// "will <entity> win the champions league?", so records lacking an
    /// explicit event reference can still collapse into one group.
    pub fn base_question(&self, question: &str, entity: &str) -> String {
        let substituted = match Regex::new(&format!("(?i){}", regex::escape(entity))) {
            Ok(re) => re.replace_all(question, ENTITY_PLACEHOLDER).into_owned(),
            // An entity that breaks regex escaping does not exist in
            // practice; fall back to the raw question
            Err(_) => question.to_string(),
        };

        normalize_whitespace(&substituted.to_lowercase())
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(PatternSet::builtin())
    }
}

/// Collapse runs of whitespace and trim
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
