//! Undo/redo history engine.
//!
//! An append-only array of snapshots plus a cursor that lives in
//! `state.undo`. Entries are immutable once pushed: they are deep-cloned on
//! push and deep-cloned again on restore, so later mutations can never
//! reach back into history.
//!
//! Pushing while the cursor sits mid-history discards the entries after it
//! (a new edit invalidates the redo tail), matching the usual
//! stack-clearing behavior of linear undo.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Immutable snapshot of `components` + `page.data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub components: HashMap<String, Value>,
    pub page_data: Value,
}

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the last entry, the `end` fed to cursor-flag recomputation
    pub fn end(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn get(&self, cursor: usize) -> Option<&Snapshot> {
        self.entries.get(cursor)
    }

    /// Replace all history with a single initial snapshot
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries = vec![snapshot];
    }

    /// Append a snapshot after `cursor`, discarding any entries beyond it.
    /// Returns the new cursor (the index of the pushed entry).
    pub fn push_after(&mut self, cursor: usize, snapshot: Snapshot) -> usize {
        self.entries.truncate(cursor + 1);
        self.entries.push(snapshot);
        self.entries.len() - 1
    }
}
