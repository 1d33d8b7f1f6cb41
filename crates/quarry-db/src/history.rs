//! Statement observers and query history.
//!
//! A [`Database`](crate::Database) notifies every registered
//! [`QueryObserver`] once per executed statement, before list expansion.
//! [`QueryHistory`] is the observer used for debugging: it counts
//! statements, keeps their SQL and parameters, and can persist a
//! [`HistorySnapshot`] into a [`HistoryStore`] so the history survives
//! from one connection to the next.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use quarry_core::Param;
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Note appended to the history each time it is saved.
pub const SAVED_NOTE: &str = "Saved query-history to session.";

/// Receives every statement a database executes.
pub trait QueryObserver: Send + Sync {
    /// Called before the statement is prepared.
    fn on_statement(&self, sql: &str, params: &[Param]);
}

/// One recorded statement or note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the entry was recorded.
    pub at: DateTime<Utc>,
    /// The SQL as given to `execute`, or a free-form note.
    pub sql: String,
    /// Rendered parameters; `None` for notes.
    pub params: Option<Vec<String>>,
}

/// Serializable state of a [`QueryHistory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Number of executed statements.
    pub num_queries: usize,
    /// Statements and notes in order.
    pub entries: Vec<HistoryEntry>,
}

/// Renders a parameter the way it appears in history and error output.
#[must_use]
pub fn describe_param(param: &Param) -> String {
    match param {
        Param::Scalar(value) => value.to_sql_inline(),
        Param::List(items) => {
            let items: Vec<String> = items.iter().map(|v| v.to_sql_inline()).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

/// Collects every executed statement.
#[derive(Debug, Default)]
pub struct QueryHistory {
    state: Mutex<HistorySnapshot>,
}

impl QueryHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HistorySnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of executed statements.
    #[must_use]
    pub fn num_queries(&self) -> usize {
        self.state().num_queries
    }

    /// All recorded entries, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<HistoryEntry> {
        self.state().entries.clone()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        self.state().clone()
    }

    /// Replaces the current state.
    pub fn restore(&self, snapshot: HistorySnapshot) {
        *self.state() = snapshot;
    }

    /// Appends a note that does not count as a statement.
    pub fn note(&self, text: impl Into<String>) {
        self.state().entries.push(HistoryEntry {
            at: Utc::now(),
            sql: text.into(),
            params: None,
        });
    }

    /// Renders the history as plain text.
    #[must_use]
    pub fn dump(&self) -> String {
        let state = self.state();
        let mut out = format!(
            "You have made {} database queries.\n\n",
            state.num_queries
        );
        for entry in &state.entries {
            out.push_str(&entry.sql);
            out.push_str("\n\n");
            if let Some(params) = entry.params.as_ref().filter(|p| !p.is_empty()) {
                out.push_str(&params.join("\n"));
                out.push_str("\n\n");
            }
        }
        out
    }

    /// Saves the history under `key`, after appending `extra` (if any) and
    /// a closing note.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the snapshot cannot be written.
    pub fn save(&self, store: &dyn HistoryStore, key: &str, extra: Option<&str>) -> Result<()> {
        if let Some(extra) = extra {
            self.note(extra);
        }
        self.note(SAVED_NOTE);
        store.save(key, &self.snapshot())
    }

    /// Replaces the history with the snapshot saved under `key` and removes
    /// it from the store. Returns whether a snapshot was found.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the snapshot cannot be read.
    pub fn load(&self, store: &dyn HistoryStore, key: &str) -> Result<bool> {
        match store.take(key)? {
            Some(snapshot) => {
                self.restore(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl QueryObserver for QueryHistory {
    fn on_statement(&self, sql: &str, params: &[Param]) {
        let mut state = self.state();
        state.num_queries += 1;
        state.entries.push(HistoryEntry {
            at: Utc::now(),
            sql: sql.to_string(),
            params: Some(params.iter().map(describe_param).collect()),
        });
    }
}

/// Keyed storage for history snapshots.
pub trait HistoryStore: Send + Sync {
    /// Stores a snapshot, replacing any previous one under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be written.
    fn save(&self, key: &str, snapshot: &HistorySnapshot) -> Result<()>;

    /// Removes and returns the snapshot under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    fn take(&self, key: &str) -> Result<Option<HistorySnapshot>>;
}

/// A process-local [`HistoryStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: Mutex<BTreeMap<String, HistorySnapshot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a snapshot is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl HistoryStore for MemoryStore {
    fn save(&self, key: &str, snapshot: &HistorySnapshot) -> Result<()> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), snapshot.clone());
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<HistorySnapshot>> {
        Ok(self
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key))
    }
}

/// A [`HistoryStore`] kept in a JSON file, one object member per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Uses the file at `path`; it is created on first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn io_error(&self, source: std::io::Error) -> DbError {
        DbError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, HistorySnapshot>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_all(&self, snapshots: &BTreeMap<String, HistorySnapshot>) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshots)?;
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

impl HistoryStore for JsonFileStore {
    fn save(&self, key: &str, snapshot: &HistorySnapshot) -> Result<()> {
        let mut snapshots = self.read_all()?;
        snapshots.insert(key.to_string(), snapshot.clone());
        self.write_all(&snapshots)
    }

    fn take(&self, key: &str) -> Result<Option<HistorySnapshot>> {
        let mut snapshots = self.read_all()?;
        let snapshot = snapshots.remove(key);
        if snapshot.is_some() {
            self.write_all(&snapshots)?;
        }
        Ok(snapshot)
    }
}
