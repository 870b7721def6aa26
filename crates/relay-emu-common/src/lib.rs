//! ---
//! emu_section: "01-core-functionality"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Shared primitives and utilities for the emulator runtime."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! Core shared primitives for the relay-emu workspace.
//! This crate exposes configuration loading, logging initialisation, build metadata, and
//! the query-string parsing used by both addressable surfaces.

pub mod config;
pub mod logging;
pub mod query;
pub mod version;

pub use config::{
    ApiConfig, AppConfig, DeviceConfig, KvsConfig, LoadedAppConfig, LoggingConfig, MetricsConfig,
};
pub use logging::{init_tracing, LogFormat, LogGuards, LogSurface};
pub use query::{split_target, QueryArgs, QueryError};
pub use version::VersionInfo;
