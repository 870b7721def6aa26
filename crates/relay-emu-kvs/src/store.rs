//! ---
//! emu_section: "02-versioned-store"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Versioned key-value store primitive and standalone service dispatch."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::entry::{VersionedEntry, ABSENT_VERSION};
use crate::error::KvsError;

/// Response to a successful `set`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SetOutcome {
    pub version: i64,
}

/// A value and its version, as returned by `get` and `listall`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntryView {
    pub value: String,
    pub version: i64,
}

impl From<&VersionedEntry> for EntryView {
    fn from(entry: &VersionedEntry) -> Self {
        Self {
            value: entry.value().to_owned(),
            version: entry.version(),
        }
    }
}

/// Response to `delete`. The two shapes are distinct on the wire:
/// `{"lastversion":N}` when a key was removed and `{"version":-1}` otherwise.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DeleteOutcome {
    Removed { lastversion: i64 },
    Absent { version: i64 },
}

impl DeleteOutcome {
    pub fn absent() -> Self {
        DeleteOutcome::Absent {
            version: ABSENT_VERSION,
        }
    }
}

/// String-keyed map of [`VersionedEntry`] values.
///
/// Entries are created on first `set` and dropped on `delete`, so a re-created
/// key starts over at version 0. The map never holds an entry at
/// [`ABSENT_VERSION`].
///
/// There is no internal locking: callers sharing a store between threads must
/// serialise whole operations (the server wraps it in a mutex).
#[derive(Debug, Clone, Default)]
pub struct VersionedStore {
    table: HashMap<String, VersionedEntry>,
}

impl VersionedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) -> SetOutcome {
        let entry = self.table.entry(key.to_owned()).or_default();
        let version = entry.update(value);
        debug!(key, version, "kvs entry written");
        SetOutcome { version }
    }

    pub fn get(&self, key: &str) -> Result<EntryView, KvsError> {
        self.table
            .get(key)
            .map(EntryView::from)
            .ok_or_else(|| KvsError::KeyNotFound(key.to_owned()))
    }

    pub fn delete(&mut self, key: &str) -> DeleteOutcome {
        match self.table.remove(key) {
            Some(entry) => {
                debug!(key, lastversion = entry.version(), "kvs entry deleted");
                DeleteOutcome::Removed {
                    lastversion: entry.version(),
                }
            }
            None => {
                debug!(key, "kvs delete of absent key");
                DeleteOutcome::absent()
            }
        }
    }

    /// Every key mapped to its value and version, ordered by key.
    pub fn list_all(&self) -> BTreeMap<String, EntryView> {
        self.table
            .iter()
            .map(|(key, entry)| (key.clone(), EntryView::from(entry)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
