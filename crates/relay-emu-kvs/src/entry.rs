//! ---
//! emu_section: "02-versioned-store"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Versioned key-value store primitive and standalone service dispatch."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---

/// Version reported for a key that has never been written.
pub const ABSENT_VERSION: i64 = -1;

/// A stored value together with the number of writes it has seen.
///
/// A fresh entry sits at [`ABSENT_VERSION`]; the first [`update`](Self::update)
/// moves it to `0` and every later update adds one, even when the value is
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedEntry {
    value: String,
    version: i64,
}

impl VersionedEntry {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            version: ABSENT_VERSION,
        }
    }

    /// Replace the value and bump the version. Returns the new version.
    pub fn update(&mut self, value: impl Into<String>) -> i64 {
        self.value = value.into();
        self.version += 1;
        self.version
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn version(&self) -> i64 {
        self.version
    }
}

impl Default for VersionedEntry {
    fn default() -> Self {
        Self::new()
    }
}
