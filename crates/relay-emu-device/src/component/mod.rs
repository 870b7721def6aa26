//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Component contract and the concrete device components."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! Every component kind implements [`Component`]: the shared
//! `GetConfig`/`SetConfig`/`GetStatus` capability set plus a closed
//! per-kind operation enum. An operation name that does not parse into that
//! enum never reaches the component's state.

use std::fmt;
use std::str::FromStr;

use relay_emu_common::QueryArgs;
use serde_json::{json, Value};
use strum::{Display, IntoStaticStr};
use tracing::{info, warn};

use crate::error::DeviceError;
use crate::kind::ComponentKind;

mod input;
mod kvs;
mod script;
mod switch;
mod system;

pub use input::{InputComponent, InputOperation};
pub use kvs::{KvsComponent, KvsOperation};
pub use script::{ScriptComponent, ScriptOperation};
pub use switch::{SwitchComponent, SwitchOperation};
pub use system::{SystemComponent, SystemOperation};

/// Result of a component operation: a JSON object on success.
pub type OpResult = Result<Value, DeviceError>;

/// Two-valued state of a digital input or relay output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BinaryState {
    #[default]
    Off,
    On,
}

impl BinaryState {
    pub fn is_on(self) -> bool {
        matches!(self, BinaryState::On)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn flipped(self) -> Self {
        match self {
            BinaryState::Off => BinaryState::On,
            BinaryState::On => BinaryState::Off,
        }
    }
}

impl From<bool> for BinaryState {
    fn from(on: bool) -> Self {
        if on {
            BinaryState::On
        } else {
            BinaryState::Off
        }
    }
}

/// Capability contract shared by every component kind.
pub trait Component {
    /// Closed set of operation names this kind answers to.
    type Operation: FromStr + Copy + fmt::Display;

    const KIND: ComponentKind;

    fn get_config(&self, args: &QueryArgs) -> OpResult;

    fn set_config(&mut self, args: &QueryArgs) -> OpResult;

    fn get_status(&self, args: &QueryArgs) -> OpResult;

    /// Run an already-recognised operation.
    fn invoke(&mut self, operation: Self::Operation, args: &QueryArgs) -> OpResult;

    /// Look up `name` in the operation table and invoke it.
    fn call(&mut self, name: &str, args: &QueryArgs) -> OpResult {
        let Ok(operation) = name.parse::<Self::Operation>() else {
            warn!(component = %Self::KIND, operation = name, "operation not found");
            return Err(DeviceError::OperationNotFound {
                kind: Self::KIND,
                operation: name.to_owned(),
            });
        };
        self.invoke(operation, args)
    }
}

/// Mutable handle to one resolved component instance.
#[derive(Debug)]
pub enum ComponentMut<'a> {
    Input(&'a mut InputComponent),
    Switch(&'a mut SwitchComponent),
    System(&'a mut SystemComponent),
    Kvs(&'a mut KvsComponent),
    Script(&'a mut ScriptComponent),
}

impl ComponentMut<'_> {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentMut::Input(_) => InputComponent::KIND,
            ComponentMut::Switch(_) => SwitchComponent::KIND,
            ComponentMut::System(_) => SystemComponent::KIND,
            ComponentMut::Kvs(_) => KvsComponent::KIND,
            ComponentMut::Script(_) => ScriptComponent::KIND,
        }
    }

    pub fn call(self, name: &str, args: &QueryArgs) -> OpResult {
        match self {
            ComponentMut::Input(component) => component.call(name, args),
            ComponentMut::Switch(component) => component.call(name, args),
            ComponentMut::System(component) => component.call(name, args),
            ComponentMut::Kvs(component) => component.call(name, args),
            ComponentMut::Script(component) => component.call(name, args),
        }
    }
}

pub(crate) fn not_implemented(kind: ComponentKind, operation: impl fmt::Display) -> OpResult {
    warn!(component = %kind, %operation, "operation not implemented");
    Err(DeviceError::NotImplemented {
        kind,
        operation: operation.to_string(),
    })
}

/// `SetConfig` acknowledgement. Config write-through is not emulated, so the
/// arguments are logged and dropped.
pub(crate) fn acknowledge_config(kind: ComponentKind, id: Option<usize>, args: &QueryArgs) -> Value {
    info!(
        component = %kind,
        id = ?id,
        fields = args.len(),
        "SetConfig acknowledged without write-through"
    );
    json!({ "restart_required": false })
}

pub(crate) fn require_arg<'a>(args: &'a QueryArgs, name: &str) -> Result<&'a str, DeviceError> {
    args.get(name)
        .ok_or_else(|| DeviceError::malformed(format!("missing required argument '{name}'")))
}

pub(crate) fn parse_bool(args: &QueryArgs, name: &str) -> Result<bool, DeviceError> {
    let raw = require_arg(args, name)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DeviceError::malformed(format!(
            "argument '{name}' must be a boolean, got '{raw}'"
        ))),
    }
}
