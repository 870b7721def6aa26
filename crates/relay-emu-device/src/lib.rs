//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Component dispatch engine for the emulated relay device."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! Component dispatch engine for the emulated relay device.
//!
//! A request target is lowered into a [`Command`] by [`router::parse_target`]
//! (structured `/rpc/<Kind>.<Operation>` grammar) or by the
//! [`relay`] adapter (legacy `/relay/<id>?turn=` grammar). The
//! [`DeviceRegistry`] resolves the command to one component instance and
//! invokes the operation on it.

pub mod command;
pub mod component;
pub mod error;
pub mod kind;
pub mod registry;
pub mod relay;
pub mod router;

pub use command::{Command, Convention};
pub use component::{
    BinaryState, Component, ComponentMut, InputComponent, KvsComponent, OpResult,
    ScriptComponent, SwitchComponent, SystemComponent,
};
pub use error::DeviceError;
pub use kind::ComponentKind;
pub use registry::DeviceRegistry;
pub use router::parse_target;
