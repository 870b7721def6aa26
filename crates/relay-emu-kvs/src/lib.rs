//! ---
//! emu_section: "02-versioned-store"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Versioned key-value store primitive and standalone service dispatch."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! A string-keyed map whose entries carry a per-key version that increases on
//! every write. The same [`VersionedStore`] backs the device's KVS component
//! and the standalone store service exposed by [`KvsService`].

pub mod entry;
pub mod error;
pub mod service;
pub mod store;

pub use entry::{VersionedEntry, ABSENT_VERSION};
pub use error::KvsError;
pub use service::{KvsService, StoreOperation, StoreResponse};
pub use store::{DeleteOutcome, EntryView, SetOutcome, VersionedStore};
