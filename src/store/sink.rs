//! Durable record storage — one JSON file per listing id.
//!
//! Layout: `<records_dir>/<site>/<id>.json`. The directory is enumerated once
//! at session setup to seed the seen set; after that, existence is re-checked
//! before every write as a defense against double-writes across restarts.

use super::RecordStore;
use crate::core::types::ListingRecord;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct PersistenceSink {
    dir: PathBuf,
}

impl PersistenceSink {
    pub fn new(records_dir: &Path, site: &str) -> Self {
        Self {
            dir: records_dir.join(site),
        }
    }

    /// Enumerate ids already on disk. Missing directory means a first run —
    /// an empty set, not an error.
    pub fn existing_ids(&self) -> io::Result<HashSet<String>> {
        let mut ids = HashSet::new();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no record directory yet at {}", self.dir.display());
                return Ok(ids);
            }
            Err(e) => return Err(e),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.insert(stem.to_string());
                }
            }
        }
        info!("loaded {} previously persisted listing ids", ids.len());
        Ok(ids)
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write every admitted, not-yet-confirmed record as its own file.
    ///
    /// Ids whose file already exists are skipped and marked flushed — a crash
    /// between write and bookkeeping must not produce a rewrite on the next
    /// flush. Invoked once per completed page, so a crash exposes at most one
    /// page's worth of extracted-but-unflushed work.
    pub fn flush(&self, store: &mut RecordStore) -> io::Result<usize> {
        let pending: Vec<ListingRecord> = store.unflushed().cloned().collect();
        if pending.is_empty() {
            return Ok(0);
        }

        std::fs::create_dir_all(&self.dir)?;
        let mut written = 0;
        for record in pending {
            let path = self.record_path(&record.id);
            if path.exists() {
                warn!("record {} already on disk — skipping write", record.id);
                store.mark_flushed(&record.id);
                continue;
            }
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            std::fs::write(&path, json)?;
            store.mark_flushed(&record.id);
            written += 1;
        }
        if written > 0 {
            info!("flushed {} new records to {}", written, self.dir.display());
        }
        Ok(written)
    }
}
