//! ---
//! emu_section: "05-networking-external-interfaces"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "HTTP surfaces for the device and the standalone store."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! HTTP surfaces of the emulator.
//!
//! * [`spawn_device_server`] serves the emulated device: structured
//!   `/rpc/<Kind>.<Operation>` targets and legacy `/relay/<id>` targets.
//! * [`spawn_kvs_server`] serves the standalone versioned store:
//!   `/set`, `/get`, `/delete`, `/listall`.
//!
//! Both answer with a JSON object. Every recoverable error becomes a status
//! code plus an `{"error": ...}` body; none of them stops the server.

mod device;
mod error;
mod kvs;
mod server;

pub use device::{device_router, spawn_device_server, DeviceState};
pub use error::ApiError;
pub use kvs::{kvs_router, spawn_kvs_server, StoreState};
pub use server::ApiServer;
