//! Declarative entity pattern table
//!
//! Entity extraction used to be a chain of special cases. Here every
//! heuristic is one `PatternRule` in an ordered table: the first rule whose
//! matcher hits a question supplies the entity, and no further rules run.
//! Built-in rules cover the recurring market families; deployments extend
//! the table from YAML without code changes.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid pattern '{name}': {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read pattern config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse pattern config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, PatternError>;

/// How a rule recognizes its entity inside a question
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Regex with exactly one capture group holding the entity
    Capture(Regex),

    /// Known-name lookup: when the question mentions `trigger`, the first
    /// listed name contained in the question (case-insensitive) is the entity
    Vocabulary {
        trigger: String,
        names: Vec<String>,
    },
}

/// One entry in the ordered extraction table
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: String,
    matcher: Matcher,
}

impl PatternRule {
    /// Build a capture rule from a regex pattern
    pub fn capture(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| PatternError::InvalidRegex {
            name: name.clone(),
            source,
        })?;

        Ok(Self {
            name,
            matcher: Matcher::Capture(regex),
        })
    }

    /// Build a vocabulary rule from a trigger phrase and known names
    pub fn vocabulary(
        name: impl Into<String>,
        trigger: impl Into<String>,
        names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            matcher: Matcher::Vocabulary {
                trigger: trigger.into(),
                names,
            },
        }
    }

    /// Try this rule against a question, returning the extracted entity
    pub fn apply(&self, question: &str) -> Option<String> {
        match &self.matcher {
            Matcher::Capture(regex) => {
                let caps = regex.captures(question)?;
                let entity = caps.get(1)?.as_str().trim();
                if entity.is_empty() {
                    return None;
                }
                Some(entity.to_string())
            }
            Matcher::Vocabulary { trigger, names } => {
                let question_lower = question.to_lowercase();
                if !question_lower.contains(&trigger.to_lowercase()) {
                    return None;
                }
                names
                    .iter()
                    .find(|name| question_lower.contains(&name.to_lowercase()))
                    .cloned()
            }
        }
    }
}

/// Rule entry as written in the YAML config file
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleConfig {
    Regex { name: String, pattern: String },
    Vocabulary {
        name: String,
        trigger: String,
        names: Vec<String>,
    },
}

/// Pattern config file: extra rules appended after the built-in table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternConfig {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl PatternConfig {
    /// Parse a YAML pattern config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML pattern config from disk
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

// Built-in rules, most specific first. Each regex carries exactly one
// capture group: the entity.
static BUILTIN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    let table: &[(&str, &str)] = &[
        (
            "epl_top_goalscorer",
            r"(?i)will\s+([A-Za-z\s\-'\.]+?)\s+be\s+the\s+top\s+(?:goalscorer|scorer)\s+in\s+the\s+(?:EPL|English\s+Premier\s+League)\s*\?",
        ),
        (
            "champions_league_winner",
            r"(?i)will\s+(.+?)\s+win\s+the\s+(?:UEFA\s+)?Champions\s+League\s*\?",
        ),
        (
            "europa_league_winner",
            r"(?i)will\s+(.+?)\s+win\s+the\s+(?:\d{4}\s+)?(?:UEFA\s+)?Europa\s+League\s*\?",
        ),
        (
            "la_liga_winner",
            r"(?i)will\s+(.+?)\s+win\s+(?:the\s+)?La\s+Liga\s*\?",
        ),
        (
            "premier_league_winner",
            r"(?i)will\s+(.+?)\s+win\s+the\s+Premier\s+League\s*\?",
        ),
        (
            "serie_a_winner",
            r"(?i)will\s+(.+?)\s+win\s+Serie\s+A\s*\?",
        ),
        (
            "bundesliga_winner",
            r"(?i)will\s+(.+?)\s+win\s+(?:the\s+)?Bundesliga\s*\?",
        ),
        (
            "ligue_1_winner",
            r"(?i)will\s+(.+?)\s+win\s+Ligue\s+1\s*\?",
        ),
        (
            "stanley_cup_winner",
            r"(?i)will\s+(?:the\s+)?(.+?)\s+win\s+the\s+(?:\d{4}\s+)?Stanley\s+Cup\s*\?",
        ),
        (
            "president_elect",
            r"(?i)will\s+(.+?)\s+be\s+(?:elected|the\s+next)\s+president\s+of\s+.+?\s*\?",
        ),
        (
            "oscar_winner",
            r"(?i)will\s+(.+?)\s+win\s+the\s+Oscar\s+for\s+(?:Best\s+Picture|Best\s+Director|Best\s+Actor|Best\s+Actress)",
        ),
        (
            "election_winner",
            r"(?i)will\s+(.+?)\s+win\s+the\s+.+?\s+election\s*\?",
        ),
        (
            "largest_company",
            r"(?i)will\s+(.+?)\s+be\s+the\s+largest\s+company\s+in\s+the\s+world\s+by\s+market\s+cap",
        ),
        // Generic fallbacks, kept last so specific families win
        (
            "generic_will_win",
            r"(?i)^will\s+(.+?)\s+win\s+",
        ),
        (
            "generic_will_be",
            r"(?i)^will\s+(.+?)\s+be\s+",
        ),
    ];

    table
        .iter()
        .map(|(name, pattern)| {
            PatternRule::capture(*name, pattern).expect("built-in pattern must compile")
        })
        .collect()
});

/// Ordered, immutable set of extraction rules
#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
}

impl PatternSet {
    /// The built-in rule table only
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.clone(),
        }
    }

    /// Built-in table followed by config-supplied rules, in file order
    pub fn with_config(config: &PatternConfig) -> Result<Self> {
        let mut rules = BUILTIN_RULES.clone();

        for entry in &config.rules {
            let rule = match entry {
                RuleConfig::Regex { name, pattern } => PatternRule::capture(name, pattern)?,
                RuleConfig::Vocabulary {
                    name,
                    trigger,
                    names,
                } => PatternRule::vocabulary(name, trigger, names.clone()),
            };
            rules.push(rule);
        }

        Ok(Self { rules })
    }

    /// Build from an explicit rule list (tests, custom deployments)
    pub fn from_rules(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// First matching rule wins; returns the rule name and the entity
    pub fn first_match(&self, question: &str) -> Option<(&str, String)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(question).map(|entity| (rule.name.as_str(), entity)))
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_champions_league_rule() {
        let set = PatternSet::builtin();
        let (rule, entity) = set
            .first_match("Will Arsenal win the UEFA Champions League?")
            .unwrap();
        assert_eq!(rule, "champions_league_winner");
        assert_eq!(entity, "Arsenal");
    }

    #[test]
    fn test_champions_league_without_uefa_prefix() {
        let set = PatternSet::builtin();
        let (_, entity) = set
            .first_match("Will Inter Milan win the Champions League?")
            .unwrap();
        assert_eq!(entity, "Inter Milan");
    }

    #[test]
    fn test_stanley_cup_strips_the_prefix() {
        let set = PatternSet::builtin();
        let (rule, entity) = set
            .first_match("Will the Edmonton Oilers win the 2025 Stanley Cup?")
            .unwrap();
        assert_eq!(rule, "stanley_cup_winner");
        assert_eq!(entity, "Edmonton Oilers");
    }

    #[test]
    fn test_top_goalscorer_rule() {
        let set = PatternSet::builtin();
        let (rule, entity) = set
            .first_match("Will Mohamed Salah be the top goalscorer in the EPL?")
            .unwrap();
        assert_eq!(rule, "epl_top_goalscorer");
        assert_eq!(entity, "Mohamed Salah");
    }

    #[test]
    fn test_president_rule() {
        let set = PatternSet::builtin();
        let (rule, entity) = set
            .first_match("Will Gavin Newsom be elected president of the United States?")
            .unwrap();
        assert_eq!(rule, "president_elect");
        assert_eq!(entity, "Gavin Newsom");
    }

    #[test]
    fn test_specific_rule_wins_over_generic() {
        let set = PatternSet::builtin();
        // Both champions_league_winner and generic_will_win match; the
        // specific rule sits earlier in the table
        let (rule, _) = set
            .first_match("Will Barcelona win the Champions League?")
            .unwrap();
        assert_eq!(rule, "champions_league_winner");
    }

    #[test]
    fn test_generic_fallback() {
        let set = PatternSet::builtin();
        let (rule, entity) = set.first_match("Will Lakers win the NBA Finals?").unwrap();
        assert_eq!(rule, "generic_will_win");
        assert_eq!(entity, "Lakers");
    }

    #[test]
    fn test_no_match_yields_none() {
        let set = PatternSet::builtin();
        assert!(set.first_match("Bitcoin above $100k on Dec 31?").is_none());
    }

    #[test]
    fn test_vocabulary_rule() {
        let rule = PatternRule::vocabulary(
            "nhl_teams",
            "Stanley Cup",
            vec!["Edmonton Oilers".to_string(), "Florida Panthers".to_string()],
        );

        assert_eq!(
            rule.apply("Can the FLORIDA PANTHERS repeat in the Stanley Cup final?"),
            Some("Florida Panthers".to_string())
        );
        assert_eq!(rule.apply("Will Florida Panthers win the World Series?"), None);
    }

    #[test]
    fn test_config_rules_append_after_builtins() {
        let yaml = r#"
rules:
  - kind: regex
    name: f1_champion
    pattern: "(?i)will\\s+(.+?)\\s+win\\s+the\\s+F1\\s+drivers'\\s+championship\\s*\\?"
  - kind: vocabulary
    name: nhl_teams
    trigger: "Stanley Cup"
    names:
      - Carolina Hurricanes
      - Winnipeg Jets
"#;
        let config = PatternConfig::from_yaml(yaml).unwrap();
        let set = PatternSet::with_config(&config).unwrap();

        let (rule, entity) = set
            .first_match("Will Max Verstappen win the F1 drivers' championship?")
            .unwrap();
        assert_eq!(rule, "f1_champion");
        assert_eq!(entity, "Max Verstappen");

        // Built-ins still evaluated first
        let (rule, _) = set
            .first_match("Will Arsenal win the Champions League?")
            .unwrap();
        assert_eq!(rule, "champions_league_winner");
    }

    #[test]
    fn test_invalid_config_regex_is_an_error() {
        let yaml = r#"
rules:
  - kind: regex
    name: broken
    pattern: "(unclosed"
"#;
        let config = PatternConfig::from_yaml(yaml).unwrap();
        assert!(PatternSet::with_config(&config).is_err());
    }
}
