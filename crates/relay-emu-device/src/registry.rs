//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Device state registry owning every component instance."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use relay_emu_common::DeviceConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::command::Command;
use crate::component::{
    ComponentMut, InputComponent, KvsComponent, OpResult, ScriptComponent, SwitchComponent,
    SystemComponent,
};
use crate::error::DeviceError;
use crate::kind::ComponentKind;
use crate::router::parse_target;

/// Owner of every component instance of one emulated device.
///
/// Each kind has a fixed number of instances addressed by ordinal id. The
/// registry is an explicit value: create one per emulated device and hand it
/// (behind a lock when shared) to whatever serves requests.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    inputs: Vec<InputComponent>,
    switches: Vec<SwitchComponent>,
    scripts: Vec<ScriptComponent>,
    system: SystemComponent,
    kvs: KvsComponent,
}

impl DeviceRegistry {
    pub fn new(layout: &DeviceConfig) -> Self {
        debug!(
            inputs = layout.inputs,
            switches = layout.switches,
            scripts = layout.scripts,
            "setting up emulated hardware"
        );
        Self {
            inputs: (0..layout.inputs).map(InputComponent::new).collect(),
            switches: (0..layout.switches).map(SwitchComponent::new).collect(),
            scripts: (0..layout.scripts).map(ScriptComponent::new).collect(),
            system: SystemComponent::new(),
            kvs: KvsComponent::new(),
        }
    }

    /// Number of addressable instances of `kind`.
    pub fn instance_count(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Input => self.inputs.len(),
            ComponentKind::Switch => self.switches.len(),
            ComponentKind::Script => self.scripts.len(),
            ComponentKind::System | ComponentKind::Kvs => 1,
        }
    }

    /// Resolve `(kind, id)` to a component instance.
    ///
    /// Multi-instance kinds need an id inside `0..instance_count`; singleton
    /// kinds accept no id or id `0`.
    pub fn resolve(
        &mut self,
        kind: ComponentKind,
        id: Option<i64>,
    ) -> Result<ComponentMut<'_>, DeviceError> {
        let index = match id {
            Some(raw) => match usize::try_from(raw) {
                Ok(index) => index,
                Err(_) => return Err(id_not_found(kind, id)),
            },
            None if kind.is_singleton() => 0,
            None => return Err(id_not_found(kind, id)),
        };
        let resolved = match kind {
            ComponentKind::Input => self.inputs.get_mut(index).map(ComponentMut::Input),
            ComponentKind::Switch => self.switches.get_mut(index).map(ComponentMut::Switch),
            ComponentKind::Script => self.scripts.get_mut(index).map(ComponentMut::Script),
            ComponentKind::System => (index == 0).then_some(ComponentMut::System(&mut self.system)),
            ComponentKind::Kvs => (index == 0).then_some(ComponentMut::Kvs(&mut self.kvs)),
        };
        resolved.ok_or_else(|| id_not_found(kind, id))
    }

    /// Resolve the command's instance, then invoke its operation.
    ///
    /// The id range is checked before the operation name, so an out-of-range id
    /// is never reported as an unknown operation. When an id was supplied and
    /// the result carries an `id` field, that field is set to the addressed id.
    pub fn execute(&mut self, command: &Command) -> OpResult {
        debug!(
            component = %command.kind,
            id = ?command.id,
            operation = %command.operation,
            convention = %command.convention,
            "dispatching command"
        );
        let component = self.resolve(command.kind, command.id)?;
        let mut result = component.call(&command.operation, &command.args)?;
        if let (Some(id), Some(fields)) = (command.id, result.as_object_mut()) {
            if let Some(slot) = fields.get_mut("id") {
                *slot = Value::from(id);
            }
        }
        Ok(result)
    }

    /// Parse a raw request target and execute it.
    pub fn handle(&mut self, target: &str) -> OpResult {
        let command = parse_target(target)?;
        self.execute(&command)
    }

    pub fn input(&self, id: usize) -> Option<&InputComponent> {
        self.inputs.get(id)
    }

    pub fn switch(&self, id: usize) -> Option<&SwitchComponent> {
        self.switches.get(id)
    }

    pub fn system(&self) -> &SystemComponent {
        &self.system
    }

    pub fn kvs(&self) -> &KvsComponent {
        &self.kvs
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(&DeviceConfig::default())
    }
}

fn id_not_found(kind: ComponentKind, id: Option<i64>) -> DeviceError {
    warn!(component = %kind, id = ?id, "component index does not exist");
    DeviceError::ComponentIdNotFound { kind, id }
}
