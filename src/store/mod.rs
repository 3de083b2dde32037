//! In-run record bookkeeping and cross-run deduplication.

pub mod sink;

use crate::core::types::{AdmissionResult, ListingRecord};
use crate::filter::RelevanceFilter;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// In-memory map of listing id → extracted record for the current run, plus
/// the set of ids already persisted by previous runs.
///
/// The seen set is loaded once at session setup and grows only through
/// successful [`sink::PersistenceSink`] writes; it never shrinks. Filtered-out
/// ids are deliberately *not* remembered — filter settings may change between
/// runs.
pub struct RecordStore {
    seen: HashSet<String>,
    records: HashMap<String, ListingRecord>,
    flushed: HashSet<String>,
}

impl RecordStore {
    pub fn new(seen: HashSet<String>) -> Self {
        Self {
            seen,
            records: HashMap::new(),
            flushed: HashSet::new(),
        }
    }

    /// True when this id needs no further work: persisted in a prior run or
    /// already captured during this one. Checked *before* opening the
    /// listing's detail view, so known listings are never re-extracted.
    pub fn is_known(&self, id: &str) -> bool {
        self.seen.contains(id) || self.records.contains_key(id)
    }

    /// Offer an extracted record. First extraction wins: a record whose id
    /// resurfaces under a later search task is reported `AlreadySeen` and the
    /// stored fields are left untouched.
    pub fn try_admit(&mut self, record: ListingRecord, filter: &RelevanceFilter) -> AdmissionResult {
        if self.is_known(&record.id) {
            debug!("listing {} already captured", record.id);
            return AdmissionResult::AlreadySeen;
        }
        if !filter.admit(&record) {
            debug!("listing {} rejected by relevance filter", record.id);
            return AdmissionResult::FilteredOut;
        }
        self.records.insert(record.id.clone(), record);
        AdmissionResult::Admitted
    }

    /// Admitted records not yet confirmed written.
    pub fn unflushed(&self) -> impl Iterator<Item = &ListingRecord> {
        self.records
            .values()
            .filter(|r| !self.flushed.contains(&r.id))
    }

    /// Mark an id durably written. The id joins the seen set, so idempotent
    /// re-runs skip it before extraction.
    pub fn mark_flushed(&mut self, id: &str) {
        self.flushed.insert(id.to_string());
        self.seen.insert(id.to_string());
    }

    pub fn admitted_count(&self) -> usize {
        self.records.len()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
