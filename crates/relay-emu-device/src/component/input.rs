//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Component contract and the concrete device components."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use relay_emu_common::QueryArgs;
use serde_json::json;
use strum::{Display, EnumString};

use super::{acknowledge_config, not_implemented, BinaryState, Component, OpResult};
use crate::kind::ComponentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum InputOperation {
    GetConfig,
    SetConfig,
    GetStatus,
    ResetCounters,
    Trigger,
}

/// Digital input. Nothing drives it in the emulator, so it reads OFF forever.
#[derive(Debug, Clone)]
pub struct InputComponent {
    id: usize,
    state: BinaryState,
}

impl InputComponent {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: BinaryState::Off,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> BinaryState {
        self.state
    }
}

impl Component for InputComponent {
    type Operation = InputOperation;

    const KIND: ComponentKind = ComponentKind::Input;

    fn get_config(&self, _args: &QueryArgs) -> OpResult {
        Ok(json!({
            "id": self.id,
            "name": null,
            "type": null,
            "invert": null,
            "factory_reset": null,
        }))
    }

    fn set_config(&mut self, args: &QueryArgs) -> OpResult {
        Ok(acknowledge_config(Self::KIND, Some(self.id), args))
    }

    fn get_status(&self, _args: &QueryArgs) -> OpResult {
        Ok(json!({
            "id": self.id,
            "state": self.state.as_str(),
        }))
    }

    fn invoke(&mut self, operation: InputOperation, args: &QueryArgs) -> OpResult {
        match operation {
            InputOperation::GetConfig => self.get_config(args),
            InputOperation::SetConfig => self.set_config(args),
            InputOperation::GetStatus => self.get_status(args),
            InputOperation::ResetCounters | InputOperation::Trigger => {
                not_implemented(Self::KIND, operation)
            }
        }
    }
}
