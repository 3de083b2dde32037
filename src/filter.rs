//! Keyword relevance filter over listing descriptions.
//!
//! Matching is case-insensitive, diacritic-insensitive, and
//! whitespace-collapsed; every configured term must match as a whole word
//! ("java" never matches inside "javascripting"). Exclusion always overrides
//! inclusion.

use crate::core::types::ListingRecord;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// How include-terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// At least one include-term must match.
    #[default]
    Any,
    /// Every include-term must match.
    All,
}

/// Decides whether a freshly extracted record is worth keeping.
#[derive(Debug)]
pub struct RelevanceFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    mode: MatchMode,
}

/// Strip diacritics via NFKD decomposition, lowercase, and collapse runs of
/// whitespace to single spaces.
fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn word_boundary_pattern(term: &str) -> Option<Regex> {
    let normalized = normalize(term);
    if normalized.is_empty() {
        return None;
    }
    // Terms are matched against already-lowercased text; escape so user
    // terms are always literal.
    Regex::new(&format!(r"\b{}\b", regex::escape(&normalized))).ok()
}

impl RelevanceFilter {
    pub fn new<S: AsRef<str>>(include_terms: &[S], exclude_terms: &[S], mode: MatchMode) -> Self {
        Self {
            include: include_terms
                .iter()
                .filter_map(|t| word_boundary_pattern(t.as_ref()))
                .collect(),
            exclude: exclude_terms
                .iter()
                .filter_map(|t| word_boundary_pattern(t.as_ref()))
                .collect(),
            mode,
        }
    }

    /// An empty include set admits everything (subject to excludes).
    pub fn admit(&self, record: &ListingRecord) -> bool {
        self.admit_text(&record.description)
    }

    pub fn admit_text(&self, description: &str) -> bool {
        let text = normalize(description);

        let include_ok = if self.include.is_empty() {
            true
        } else {
            match self.mode {
                MatchMode::All => self.include.iter().all(|re| re.is_match(&text)),
                MatchMode::Any => self.include.iter().any(|re| re.is_match(&text)),
            }
        };

        let exclude_hit = self.exclude.iter().any(|re| re.is_match(&text));

        include_ok && !exclude_hit
    }
}
