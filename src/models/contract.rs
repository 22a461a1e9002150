//! Contract document models.
//!
//! A contract is raw extracted text plus the articles (clauses) derived from
//! it. Analysis rewrites the articles with per-sentence risk annotations
//! while keeping article identity stable.

use serde::{Deserialize, Serialize};

/// Risk classification for a single sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Danger,
    Warning,
    Safe,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Safe => "safe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "danger" => Some(Self::Danger),
            "warning" => Some(Self::Warning),
            "safe" => Some(Self::Safe),
            _ => None,
        }
    }
}

/// Article identifier as sent by the backend.
///
/// Older result payloads use numeric ids, newer ones use strings. Both
/// compare equal only within their own representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Num(i64),
    Text(String),
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ArticleId {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A single sentence within an article.
///
/// `why` and `fix` are only present after analysis, and only on sentences
/// the backend flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub text: String,
    pub risk: RiskLevel,
    /// Why the sentence was flagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    /// Suggested replacement wording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl Sentence {
    /// Create an unanalyzed sentence (defaults to safe, no annotations).
    pub fn unanalyzed(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            risk: RiskLevel::Safe,
            why: None,
            fix: None,
        }
    }
}

/// A contract article (clause) with its sentences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub sentences: Vec<Sentence>,
}

/// Tallies of sentence risk levels across a set of articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCounts {
    pub danger: u32,
    pub warning: u32,
    pub safe: u32,
    pub total: u32,
}

impl RiskCounts {
    /// Count sentence risk levels over the given articles.
    pub fn tally(articles: &[Article]) -> Self {
        let mut counts = Self::default();
        for article in articles {
            for sentence in &article.sentences {
                counts.total += 1;
                match sentence.risk {
                    RiskLevel::Danger => counts.danger += 1,
                    RiskLevel::Warning => counts.warning += 1,
                    RiskLevel::Safe => counts.safe += 1,
                }
            }
        }
        counts
    }

    /// Share of safe sentences as a percentage with one decimal place.
    /// An empty document is considered fully safe.
    pub fn safety_percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        ((self.safe as f64 / self.total as f64) * 1000.0).round() / 10.0
    }
}

/// Analysis payload returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub articles: Vec<Article>,
    pub counts: RiskCounts,
    pub safety_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl AnalysisReport {
    /// Recount risk levels from the articles themselves.
    ///
    /// The backend sends its own counts; this lets callers verify them
    /// against the payload instead of trusting the header blindly.
    pub fn recount(&self) -> RiskCounts {
        RiskCounts::tally(&self.articles)
    }
}

/// A contract document: the raw extracted text and its derived articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub raw_text: String,
    pub articles: Vec<Article>,
}

impl Contract {
    pub fn new(raw_text: impl Into<String>, articles: Vec<Article>) -> Self {
        Self {
            raw_text: raw_text.into(),
            articles,
        }
    }

    /// Total sentence count across all articles.
    pub fn sentence_count(&self) -> usize {
        self.articles.iter().map(|a| a.sentences.len()).sum()
    }

    /// Bind analysis results onto this contract.
    ///
    /// Articles are matched by id and replaced in place, so article order
    /// and identity survive the round trip. Analyzed articles with no local
    /// counterpart are appended; local articles the report does not mention
    /// keep their unanalyzed sentences.
    pub fn apply_report(&mut self, report: &AnalysisReport) {
        for analyzed in &report.articles {
            match self.articles.iter_mut().find(|a| a.id == analyzed.id) {
                Some(existing) => *existing = analyzed.clone(),
                None => self.articles.push(analyzed.clone()),
            }
        }
    }
}
