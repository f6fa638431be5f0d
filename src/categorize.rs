//! Market categorization collaborators
//!
//! The pipeline asks a categorizer for (category, needs-manual) per
//! transformed market. Production deployments put a language model behind
//! this trait; the keyword scorer below is the no-dependency fallback and
//! the default for local runs.

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CategorizeError {
    #[error("Categorizer request failed: {0}")]
    RequestFailed(String),

    #[error("Categorizer returned an unusable response: {0}")]
    BadResponse(String),
}

pub type Result<T> = std::result::Result<T, CategorizeError>;

/// Category assignment for one market
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorization {
    pub category: String,

    /// Set when the assignment is a guess a human should review
    pub needs_manual: bool,
}

/// Category-labeling collaborator
#[async_trait]
pub trait Categorizer {
    async fn categorize(&self, question: &str, description: Option<&str>)
        -> Result<Categorization>;
}

/// Category used when nothing matches
const DEFAULT_CATEGORY: &str = "news";

// Keyword vocabulary per category. Whole-word matches only; multi-word
// keywords match as phrases.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "politics",
        &[
            "election", "president", "vote", "congress", "senate", "house", "democrat",
            "republican", "political", "government", "prime minister", "parliament",
            "candidate", "campaign", "ballot",
        ],
    ),
    (
        "crypto",
        &[
            "bitcoin", "ethereum", "btc", "eth", "cryptocurrency", "crypto", "token",
            "blockchain", "coin", "mining", "wallet", "defi", "nft", "dao", "satoshi",
            "altcoin", "binance", "coinbase",
        ],
    ),
    (
        "sports",
        &[
            "football", "soccer", "nfl", "basketball", "nba", "baseball", "mlb", "hockey",
            "nhl", "tennis", "golf", "match", "tournament", "championship", "coach",
            "player", "team", "league", "olympic", "sport", "world cup", "champion",
            "boxing", "racing", "formula", "f1", "ufc", "premier league", "stanley cup",
            "champions league",
        ],
    ),
    (
        "business",
        &[
            "company", "stock", "investor", "investment", "business", "finance",
            "economic", "economy", "earnings", "revenue", "profit", "ceo", "industry",
            "shareholder", "ipo", "merger", "acquisition", "quarterly", "wall street",
            "nasdaq", "dow jones", "s&p 500", "market cap",
        ],
    ),
    (
        "culture",
        &[
            "movie", "film", "music", "artist", "actor", "actress", "celebrity", "award",
            "oscar", "emmy", "grammy", "entertainment", "box office", "album", "tv show",
            "series", "book", "author", "director", "hollywood", "concert", "festival",
            "streaming", "netflix", "disney",
        ],
    ),
    (
        "tech",
        &[
            "technology", "software", "hardware", "app", "ai", "artificial intelligence",
            "robot", "smartphone", "iphone", "android", "google", "apple", "microsoft",
            "social media", "facebook", "instagram", "twitter", "amazon", "internet",
            "web3", "digital", "virtual reality", "machine learning", "startup",
        ],
    ),
];

/// Keyword-scoring fallback categorizer
pub struct KeywordCategorizer {
    categories: Vec<(String, Vec<Regex>)>,
}

impl KeywordCategorizer {
    pub fn new() -> Self {
        let categories = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                let patterns = keywords
                    .iter()
                    .map(|keyword| {
                        Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
                            .expect("keyword pattern must compile")
                    })
                    .collect();
                (category.to_string(), patterns)
            })
            .collect();

        Self { categories }
    }

    /// Best-scoring category, or the default with the manual flag set
    fn score(&self, text: &str) -> Categorization {
        let mut best: Option<(&str, usize)> = None;

        for (category, patterns) in &self.categories {
            let hits = patterns.iter().filter(|p| p.is_match(text)).count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((category, hits));
            }
        }

        match best {
            Some((category, _)) => Categorization {
                category: category.to_string(),
                needs_manual: false,
            },
            None => Categorization {
                category: DEFAULT_CATEGORY.to_string(),
                needs_manual: true,
            },
        }
    }
}

impl Default for KeywordCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Categorizer for KeywordCategorizer {
    async fn categorize(
        &self,
        question: &str,
        description: Option<&str>,
    ) -> Result<Categorization> {
        let text = match description {
            Some(description) => format!("{question}\n{description}"),
            None => question.to_string(),
        };

        Ok(self.score(&text))
    }
}
