//! Deterministic contract text segmentation.
//!
//! Splits extracted contract text into articles (clauses) and sentences.
//! Korean contracts number their clauses `제N조 (...)`, and the backend's
//! extractors prepend a `<<title>>` header line; both start a new article.
//! Text with neither is wrapped whole into a single article so callers
//! always get a document back, just a degraded one.
//!
//! Guarantees, in segmentation order:
//! - every non-whitespace character of the input lands in exactly one
//!   article title or sentence text
//! - no sentence is empty or whitespace-only
//! - article and sentence ids are unique, and re-segmenting the same text
//!   yields the same ids

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Article, ArticleId, Contract, Sentence};

/// Clause heading at the start of a line: `제3조`, `제 3 조 (근로시간)`.
static CLAUSE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*제\s*(\d+)\s*조").unwrap());

/// Extractor header line: `<<employment_contract.pdf>>`.
static DOC_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*<<(.+?)>>\s*$").unwrap());

/// Outcome of segmenting raw text.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub contract: Contract,
    /// True when the text had no recognizable structure and was wrapped
    /// whole into a single article.
    pub degraded: bool,
}

/// Segment raw contract text into articles and sentences.
///
/// Never fails: unstructured input produces a single untitled article
/// marked as degraded.
pub fn segment(raw_text: &str) -> Segmentation {
    let normalized = raw_text.replace("\r\n", "\n");

    let mut builder = ArticleBuilder::new();
    let mut found_structure = false;

    for line in normalized.split('\n') {
        if let Some(caps) = DOC_HEADER.captures(line) {
            found_structure = true;
            builder.start_article(caps[1].trim().to_string(), None);
        } else if let Some(caps) = CLAUSE_HEADING.captures(line) {
            found_structure = true;
            let clause_no = caps[1].parse::<i64>().ok();
            builder.start_article(line.trim().to_string(), clause_no);
        } else {
            builder.push_body_line(line);
        }
    }

    let mut articles = builder.finish();

    // Unstructured text: keep the single untitled article, even when empty.
    if articles.is_empty() {
        articles.push(Article {
            id: ArticleId::Num(1),
            title: String::new(),
            sentences: Vec::new(),
        });
    }

    let degraded = !found_structure;
    if degraded {
        tracing::warn!(
            "no clause structure found, treating {} chars as a single article",
            raw_text.len()
        );
    }

    Segmentation {
        contract: Contract::new(raw_text, articles),
        degraded,
    }
}

/// Accumulates lines into articles, assigning ids as articles close.
struct ArticleBuilder {
    articles: Vec<Article>,
    used_ids: HashSet<i64>,
    current_title: Option<String>,
    current_clause_no: Option<i64>,
    current_body: Vec<String>,
}

impl ArticleBuilder {
    fn new() -> Self {
        Self {
            articles: Vec::new(),
            used_ids: HashSet::new(),
            current_title: None,
            current_clause_no: None,
            current_body: Vec::new(),
        }
    }

    fn start_article(&mut self, title: String, clause_no: Option<i64>) {
        self.close_current();
        self.current_title = Some(title);
        self.current_clause_no = clause_no;
    }

    fn push_body_line(&mut self, line: &str) {
        self.current_body.push(line.to_string());
    }

    fn close_current(&mut self) {
        let title = self.current_title.take().unwrap_or_default();
        let clause_no = self.current_clause_no.take();
        let body = std::mem::take(&mut self.current_body);

        let has_text = body.iter().any(|l| !l.trim().is_empty());
        // Preamble text before the first heading gets an untitled article;
        // a heading with an empty body still produces its article.
        if title.is_empty() && !has_text {
            return;
        }

        let id = self.allocate_id(clause_no);
        let sentences = split_sentences(&body, id);
        self.articles.push(Article {
            id: ArticleId::Num(id),
            title,
            sentences,
        });
    }

    /// Prefer the clause number from the heading so ids line up with the
    /// backend's own segmentation; fall back to the next free integer.
    fn allocate_id(&mut self, clause_no: Option<i64>) -> i64 {
        let mut id = match clause_no {
            Some(n) if !self.used_ids.contains(&n) => n,
            _ => self.used_ids.iter().max().copied().unwrap_or(0) + 1,
        };
        while !self.used_ids.insert(id) {
            id += 1;
        }
        id
    }

    fn finish(mut self) -> Vec<Article> {
        self.close_current();
        self.articles
    }
}

/// Split article body lines into sentences.
///
/// Boundaries are sentence terminators followed by whitespace, and line
/// breaks. Terminators stay attached to their sentence, so no text is lost.
fn split_sentences(body: &[String], article_id: i64) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    for line in body {
        for piece in split_line(line) {
            let text = piece.trim();
            if text.is_empty() {
                continue;
            }
            let id = format!("s{}-{}", article_id, sentences.len() + 1);
            sentences.push(Sentence::unanalyzed(id, text));
        }
    }
    sentences
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。')
}

fn split_line(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if is_terminator(c) {
            let end = idx + c.len_utf8();
            let next_is_break = chars
                .peek()
                .map(|(_, next)| next.is_whitespace())
                .unwrap_or(true);
            if next_is_break {
                pieces.push(&line[start..end]);
                start = end;
            }
        }
    }
    if start < line.len() {
        pieces.push(&line[start..]);
    }
    pieces
}
