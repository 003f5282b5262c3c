//! Persistent progress ledger keyed by work-item key.
//!
//! A flat JSON map from key to status, rewritten after every update so a
//! crash loses at most the in-flight items. The map and the backing file
//! sit behind one mutex: marks from parallel workers are serialized and
//! never interleave on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Outcome recorded for an attempted work item.
///
/// Absence of a key means "not yet attempted". A `Failed` entry is
/// re-enumerated on the next run; only `Completed` entries are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Completed,
    Failed,
}

/// Resumable progress ledger backed by a JSON file.
pub struct ProgressLedger {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, ItemStatus>>,
}

impl ProgressLedger {
    /// Load the ledger from `path`, falling back to an empty ledger when
    /// the file is missing or corrupt (logged as a warning, never fatal).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!(
                        "Progress file {} corrupted ({e}), starting fresh",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!(
                    "Cannot read progress file {} ({e}), starting fresh",
                    path.display()
                );
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// True iff `key` finished successfully in a previous run or this one.
    pub fn is_completed(&self, key: &str) -> bool {
        self.entries.lock().expect("ledger poisoned").get(key) == Some(&ItemStatus::Completed)
    }

    /// Record success for `key` and persist immediately.
    pub fn mark_completed(&self, key: &str) {
        self.mark(key, ItemStatus::Completed);
    }

    /// Record failure for `key` and persist immediately.
    pub fn mark_failed(&self, key: &str) {
        self.mark(key, ItemStatus::Failed);
    }

    fn mark(&self, key: &str, status: ItemStatus) {
        let mut entries = self.entries.lock().expect("ledger poisoned");
        entries.insert(key.to_string(), status);
        if let Err(e) = Self::persist(&self.path, &entries) {
            log::error!("Failed to persist progress to {}: {e}", self.path.display());
        }
    }

    /// Write the full snapshot. Called with the entry lock held, so
    /// concurrent marks cannot interleave their writes.
    fn persist(path: &Path, entries: &BTreeMap<String, ItemStatus>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(entries).expect("status map serializes");
        std::fs::write(path, json)
    }

    /// Number of entries with the given status.
    pub fn count(&self, status: ItemStatus) -> usize {
        self.entries
            .lock()
            .expect("ledger poisoned")
            .values()
            .filter(|&&s| s == status)
            .count()
    }

    /// Total recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("ledger poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
