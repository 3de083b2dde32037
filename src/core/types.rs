use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One configured search: a query term plus an optional location.
///
/// Tasks are enumerated once at configuration time and processed in
/// configured order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchTask {
    pub term: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl SearchTask {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            location: None,
        }
    }

    pub fn with_location(term: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            location: Some(location.into()),
        }
    }
}

/// A fully extracted job listing. Immutable once admitted to the store;
/// the `id` is the sole deduplication key across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Structured detail sections (e.g. "Job type" → ["Full-time"]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easy_apply: Option<bool>,
}

/// Outcome of offering a freshly extracted record to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionResult {
    /// New id, passed the relevance filter — kept for persistence.
    Admitted,
    /// Id already persisted in a prior run or already captured this run.
    AlreadySeen,
    /// New id but the relevance filter rejected it. The id is *not*
    /// remembered, so it stays eligible on a later run with different
    /// filter settings.
    FilteredOut,
}

/// Crawl session lifecycle. `Ready → Running` on start (browser session
/// acquired), `Running → Stopped` on stop (session released, reachable from
/// success and failure paths), `Stopped → Ready` only via explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Ready,
    Running,
    Stopped,
}

/// How a site's result list grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// Discrete pages behind a "next" control.
    Paged,
    /// A single list that grows in place (scroll-triggered); consumed
    /// entries must be tracked by offset.
    IncrementalLoad,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_without_empty_optionals() {
        let record = ListingRecord {
            id: "abc123".into(),
            url: "https://example.com/viewjob?jk=abc123".into(),
            title: "Backend Developer".into(),
            company: "Acme".into(),
            location: "Remote".into(),
            description: "Build things".into(),
            details: None,
            benefits: None,
            easy_apply: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("details"));
        assert!(!json.contains("benefits"));
        assert!(!json.contains("easy_apply"));
    }

    #[test]
    fn record_roundtrips_details_map() {
        let mut details = BTreeMap::new();
        details.insert("Job type".to_string(), vec!["Full-time".to_string()]);
        let record = ListingRecord {
            id: "1".into(),
            url: "u".into(),
            title: "t".into(),
            company: "c".into(),
            location: "l".into(),
            description: "d".into(),
            details: Some(details),
            benefits: Some(vec!["Health plan".into()]),
            easy_apply: Some(true),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ListingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.details.unwrap()["Job type"], vec!["Full-time"]);
        assert_eq!(back.easy_apply, Some(true));
    }
}
