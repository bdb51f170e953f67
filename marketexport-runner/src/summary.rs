//! Append-only run summary log (`export_summary.json`).

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use marketexport_core::domain::ExchangeCode;
use marketexport_core::store::{layout, write_json, DocumentStore, StoreError};

/// Which kind of run produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Complete history for every exchange and stock.
    Full,
    /// Latest point and fresh snapshots only.
    Incremental,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Full => f.write_str("full"),
            RunMode::Incremental => f.write_str("incremental"),
        }
    }
}

/// One completed run. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub timestamp: DateTime<Local>,
    pub mode: RunMode,
    pub exchanges_updated: usize,
    pub total_updates: usize,
    pub total_possible: usize,
    pub update_rate_percent: f64,
    pub duration_seconds: f64,
    pub exchanges: Vec<ExchangeCode>,
}

/// `updated / possible * 100` rounded to 2 decimals; 0 when nothing was attempted.
pub fn update_rate(updated: usize, possible: usize) -> f64 {
    if possible == 0 {
        return 0.0;
    }
    let rate = updated as f64 / possible as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// The summary file of a store.
pub struct SummaryLog<'a> {
    store: &'a dyn DocumentStore,
    path: PathBuf,
}

impl<'a> SummaryLog<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            path: layout::summary(),
        }
    }

    /// Append `entry` after every existing entry. Returns the new entry count.
    ///
    /// A file that is neither an array nor a single legacy object is left
    /// untouched and reported as malformed.
    pub fn append_entry(&self, entry: &SummaryEntry) -> Result<usize, StoreError> {
        let mut entries = self.raw_entries()?;
        let value = serde_json::to_value(entry).map_err(|e| StoreError::Serialize {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        entries.push(value);
        write_json(self.store, &self.path, &entries)?;
        tracing::debug!(entries = entries.len(), "summary entry appended");
        Ok(entries.len())
    }

    /// Entries that parse as [`SummaryEntry`], oldest first. Entries in an
    /// older shape are skipped.
    pub fn read_all(&self) -> Result<Vec<SummaryEntry>, StoreError> {
        Ok(self
            .raw_entries()?
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    /// Number of entries of any shape.
    pub fn entry_count(&self) -> Result<usize, StoreError> {
        Ok(self.raw_entries()?.len())
    }

    fn raw_entries(&self) -> Result<Vec<Value>, StoreError> {
        let Some(bytes) = self.store.read(&self.path)? else {
            return Ok(Vec::new());
        };
        let malformed = |reason: String| StoreError::Malformed {
            path: self.path.clone(),
            reason,
        };
        match serde_json::from_slice::<Value>(&bytes).map_err(|e| malformed(e.to_string()))? {
            Value::Array(entries) => Ok(entries),
            legacy @ Value::Object(_) => Ok(vec![legacy]),
            _ => Err(malformed("expected an array of summary entries".into())),
        }
    }
}
