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
use strum::{Display, EnumString};

use super::{not_implemented, Component, OpResult};
use crate::kind::ComponentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ScriptOperation {
    GetConfig,
    SetConfig,
    GetStatus,
    List,
    Create,
    Delete,
    Start,
    Stop,
    PutCode,
    GetCode,
    Eval,
}

/// Script slot. No script engine is emulated; every operation is a stub.
#[derive(Debug, Clone)]
pub struct ScriptComponent {
    id: usize,
}

impl ScriptComponent {
    pub fn new(id: usize) -> Self {
        Self { id }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl Component for ScriptComponent {
    type Operation = ScriptOperation;

    const KIND: ComponentKind = ComponentKind::Script;

    fn get_config(&self, _args: &QueryArgs) -> OpResult {
        not_implemented(Self::KIND, ScriptOperation::GetConfig)
    }

    fn set_config(&mut self, _args: &QueryArgs) -> OpResult {
        not_implemented(Self::KIND, ScriptOperation::SetConfig)
    }

    fn get_status(&self, _args: &QueryArgs) -> OpResult {
        not_implemented(Self::KIND, ScriptOperation::GetStatus)
    }

    fn invoke(&mut self, operation: ScriptOperation, args: &QueryArgs) -> OpResult {
        match operation {
            ScriptOperation::GetConfig => self.get_config(args),
            ScriptOperation::SetConfig => self.set_config(args),
            ScriptOperation::GetStatus => self.get_status(args),
            _ => not_implemented(Self::KIND, operation),
        }
    }
}
