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
use serde_json::{json, Value};
use strum::{Display, EnumString};
use tracing::debug;

use super::{acknowledge_config, not_implemented, parse_bool, BinaryState, Component, OpResult};
use crate::kind::ComponentKind;

/// Emulated line voltage reported by every switch.
pub const SWITCH_VOLTAGE: u32 = 120;
/// Emulated line frequency reported by every switch.
pub const SWITCH_FREQUENCY: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum SwitchOperation {
    GetConfig,
    SetConfig,
    GetStatus,
    Set,
    Toggle,
    ResetCounters,
}

/// A single relay output. Starts OFF and changes only through `Set` and `Toggle`.
#[derive(Debug, Clone)]
pub struct SwitchComponent {
    id: usize,
    output: BinaryState,
}

impl SwitchComponent {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            output: BinaryState::Off,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn output(&self) -> BinaryState {
        self.output
    }

    /// Drive the output to `on`. Returns `{"was_on": <state before the call>}`.
    pub fn set(&mut self, on: bool) -> Value {
        let prior = self.output;
        self.output = BinaryState::from(on);
        debug!(switch = self.id, was_on = prior.is_on(), output = %self.output, "switch set");
        json!({ "was_on": prior.is_on() })
    }

    /// Flip the output. Reports the prior state exactly like [`set`](Self::set).
    pub fn toggle(&mut self) -> Value {
        let prior = self.output;
        self.output = prior.flipped();
        debug!(switch = self.id, was_on = prior.is_on(), output = %self.output, "switch toggled");
        json!({ "was_on": prior.is_on() })
    }
}

impl Component for SwitchComponent {
    type Operation = SwitchOperation;

    const KIND: ComponentKind = ComponentKind::Switch;

    fn get_config(&self, _args: &QueryArgs) -> OpResult {
        Ok(json!({
            "id": self.id,
            "name": null,
            "in_mode": null,
            "initial_state": null,
            "auto_on": null,
            "auto_on_delay": null,
            "auto_off": null,
            "auto_off_delay": null,
        }))
    }

    fn set_config(&mut self, args: &QueryArgs) -> OpResult {
        Ok(acknowledge_config(Self::KIND, Some(self.id), args))
    }

    fn get_status(&self, _args: &QueryArgs) -> OpResult {
        Ok(json!({
            "id": self.id,
            "output": self.output.as_str(),
            "voltage": SWITCH_VOLTAGE,
            "freq": SWITCH_FREQUENCY,
        }))
    }

    fn invoke(&mut self, operation: SwitchOperation, args: &QueryArgs) -> OpResult {
        match operation {
            SwitchOperation::GetConfig => self.get_config(args),
            SwitchOperation::SetConfig => self.set_config(args),
            SwitchOperation::GetStatus => self.get_status(args),
            SwitchOperation::Set => {
                let on = parse_bool(args, "on")?;
                Ok(self.set(on))
            }
            SwitchOperation::Toggle => Ok(self.toggle()),
            SwitchOperation::ResetCounters => not_implemented(Self::KIND, operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeviceError;

    fn args(pairs: &[(&str, &str)]) -> QueryArgs {
        pairs.iter().copied().collect()
    }

    #[test]
    fn set_reports_prior_state() {
        let mut switch = SwitchComponent::new(0);
        assert_eq!(
            switch.call("Set", &args(&[("on", "true")])),
            Ok(json!({ "was_on": false }))
        );
        assert_eq!(
            switch.call("Set", &args(&[("on", "true")])),
            Ok(json!({ "was_on": true }))
        );
        assert_eq!(
            switch.call("Set", &args(&[("on", "false")])),
            Ok(json!({ "was_on": true }))
        );
        assert_eq!(switch.output(), BinaryState::Off);
    }

    #[test]
    fn toggle_twice_restores_state_with_complementary_reports() {
        let mut switch = SwitchComponent::new(1);
        let first = switch.call("Toggle", &QueryArgs::new()).expect("toggle");
        assert_eq!(switch.output(), BinaryState::On);
        let second = switch.call("Toggle", &QueryArgs::new()).expect("toggle");
        assert_eq!(switch.output(), BinaryState::Off);
        assert_eq!(first, json!({ "was_on": false }));
        assert_eq!(second, json!({ "was_on": true }));
    }

    #[test]
    fn status_has_fixed_electrical_constants() {
        let mut switch = SwitchComponent::new(2);
        switch.set(true);
        assert_eq!(
            switch.get_status(&QueryArgs::new()),
            Ok(json!({ "id": 2, "output": "ON", "voltage": 120, "freq": 60 }))
        );
    }

    #[test]
    fn unknown_and_stubbed_operations_leave_state_alone() {
        let mut switch = SwitchComponent::new(0);
        switch.set(true);
        assert!(matches!(
            switch.call("Explode", &QueryArgs::new()),
            Err(DeviceError::OperationNotFound { .. })
        ));
        assert!(matches!(
            switch.call("toggle", &QueryArgs::new()),
            Err(DeviceError::OperationNotFound { .. })
        ));
        assert!(matches!(
            switch.call("ResetCounters", &QueryArgs::new()),
            Err(DeviceError::NotImplemented { .. })
        ));
        assert_eq!(switch.output(), BinaryState::On);
    }

    #[test]
    fn set_requires_boolean_argument() {
        let mut switch = SwitchComponent::new(0);
        assert!(matches!(
            switch.call("Set", &args(&[("on", "yes please")])),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert!(matches!(
            switch.call("Set", &QueryArgs::new()),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert_eq!(switch.output(), BinaryState::Off);
    }

    #[test]
    fn set_config_is_acknowledged_only() {
        let mut switch = SwitchComponent::new(0);
        assert_eq!(
            switch.call("SetConfig", &args(&[("name", "porch")])),
            Ok(json!({ "restart_required": false }))
        );
        let config = switch.call("GetConfig", &QueryArgs::new()).expect("config");
        assert_eq!(config["name"], Value::Null);
    }
}
