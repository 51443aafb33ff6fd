//! Durable report cache backed by a single JSON file.
//!
//! The [`ResultStore`] maps a normalized company [`Identity`] to the last
//! successfully compiled [`Report`]. The whole file is read when the store is
//! opened and rewritten in full on every mutation.
//!
//! **Access rules:**
//! - One process owns the file. Concurrent writers race (last writer wins,
//!   no locking, no merge).
//! - A missing, unreadable or malformed file opens as an empty store.
//! - Keys are normalized on load; records with blank keys are dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use salesintel_shared::{Identity, Report, Result, SalesIntelError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One cached report plus bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Company name as first entered.
    pub display_name: String,
    pub report: Report,
    /// Set on first insertion, preserved on overwrite.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every cache hit.
    pub last_accessed_at: DateTime<Utc>,
}

/// Primary store handle: an in-memory map mirrored to `path`.
#[derive(Debug)]
pub struct ResultStore {
    path: PathBuf,
    records: BTreeMap<Identity, StoredRecord>,
}

impl ResultStore {
    /// Open the store at `path`, loading whatever is there.
    ///
    /// Never fails: a corrupt cache must not block new pipeline runs.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = load_records(&path);
        info!(path = %path.display(), records = records.len(), "result store opened");
        Self { path, records }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.records.contains_key(identity)
    }

    /// Return the cached report for `identity`, refreshing `last_accessed_at`.
    ///
    /// The access time is persisted best-effort; a failed write is logged and
    /// the cached report is still returned.
    pub fn lookup(&mut self, identity: &Identity) -> Option<Report> {
        let record = self.records.get_mut(identity)?;
        record.last_accessed_at = Utc::now();
        let report = record.report.clone();
        debug!(%identity, "result store hit");

        if let Err(e) = self.persist() {
            warn!(%identity, error = %e, "failed to persist access time");
        }
        Some(report)
    }

    /// Read a record without touching its access time.
    pub fn peek(&self, identity: &Identity) -> Option<&StoredRecord> {
        self.records.get(identity)
    }

    /// All records in identity order.
    pub fn records(&self) -> impl Iterator<Item = (&Identity, &StoredRecord)> {
        self.records.iter()
    }

    /// Insert or replace the report for `identity`.
    ///
    /// On overwrite only the report changes; `display_name`, `created_at` and
    /// `last_accessed_at` are kept. The in-memory map is updated before the
    /// file is written, so a persistence error leaves this process serving the
    /// new report while the file on disk is stale.
    pub fn put(&mut self, identity: &Identity, display_name: &str, report: &Report) -> Result<()> {
        match self.records.get_mut(identity) {
            Some(existing) => {
                existing.report = report.clone();
            }
            None => {
                let now = Utc::now();
                self.records.insert(
                    identity.clone(),
                    StoredRecord {
                        display_name: display_name.to_string(),
                        report: report.clone(),
                        created_at: now,
                        last_accessed_at: now,
                    },
                );
            }
        }

        self.persist()?;
        info!(%identity, path = %self.path.display(), "report stored");
        Ok(())
    }

    /// Evict one company. Returns whether a record existed.
    pub fn remove(&mut self, identity: &Identity) -> Result<bool> {
        if self.records.remove(identity).is_none() {
            return Ok(false);
        }
        self.persist()?;
        info!(%identity, "record removed");
        Ok(true)
    }

    /// Evict everything. Returns the number of records dropped.
    pub fn clear(&mut self) -> Result<usize> {
        let count = self.records.len();
        self.records.clear();
        self.persist()?;
        warn!(count, "result store cleared");
        Ok(count)
    }

    /// Serialize the whole map and replace the backing file.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SalesIntelError::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(&self.records)?;

        // Write to a sibling temp file first, then rename over the target
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "store.json".into());
        let temp = self.path.with_file_name(format!(".{file_name}.tmp"));

        std::fs::write(&temp, content).map_err(|e| SalesIntelError::io(&temp, e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| SalesIntelError::io(&self.path, e))?;
        Ok(())
    }
}

/// Read the backing file, degrading to an empty map on any problem.
///
/// Keys are re-normalized and records are decoded one by one: a blank key or
/// an undecodable record is dropped without losing the rest. Keys that
/// normalize to the same identity keep the most recently accessed record.
fn load_records(path: &Path) -> BTreeMap<Identity, StoredRecord> {
    if !path.exists() {
        debug!(path = %path.display(), "store file not found, starting empty");
        return BTreeMap::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "store file unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "store file malformed, starting empty");
            return BTreeMap::new();
        }
    };

    let mut records: BTreeMap<Identity, StoredRecord> = BTreeMap::new();
    for (key, value) in raw {
        let identity = match Identity::parse(&key) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(key = %key, error = %e, "dropping record with invalid key");
                continue;
            }
        };
        let record: StoredRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(%identity, error = %e, "dropping undecodable record");
                continue;
            }
        };
        if identity.as_str() != key {
            debug!(key = %key, %identity, "normalized stored key");
        }

        if let Some(existing) = records.get(&identity) {
            warn!(%identity, "duplicate stored key, keeping the most recently used record");
            if existing.last_accessed_at >= record.last_accessed_at {
                continue;
            }
        }
        records.insert(identity, record);
    }
    records
}
