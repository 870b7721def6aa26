//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Legacy relay grammar lowered onto Switch commands."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! Legacy `/relay/<id>?turn=on|off|toggle` grammar.
//!
//! The adapter only rewrites the request: `turn=on`/`turn=off` become
//! `Switch.Set` with an explicit `on`, `turn=toggle` becomes `Switch.Toggle`.
//! Execution goes through the same registry path as the structured grammar.

use relay_emu_common::QueryArgs;
use strum::EnumString;
use tracing::{info, warn};

use crate::command::{Command, Convention};
use crate::component::SwitchOperation;
use crate::error::DeviceError;
use crate::kind::ComponentKind;
use crate::router;

const RELAY_PREFIX: &str = "/relay";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Turn {
    On,
    Off,
    Toggle,
}

/// Return the remainder after `/relay` when `path` uses the legacy grammar.
pub(crate) fn strip_relay_prefix(path: &str) -> Option<&str> {
    path.strip_prefix(RELAY_PREFIX)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Lower `/<id>` plus the query arguments into a Switch command.
pub(crate) fn lower(rest: &str, args: QueryArgs) -> Result<Command, DeviceError> {
    let segment = rest.strip_prefix('/').unwrap_or(rest);
    let id = router::parse_index(segment).ok_or_else(|| {
        warn!(segment, "relay index is not an integer");
        DeviceError::malformed(format!("relay index '{segment}' is not an integer"))
    })?;

    let Some(raw_turn) = args.get("turn") else {
        warn!(relay = id, "relay request without turn argument");
        return Err(DeviceError::malformed("missing required argument 'turn'"));
    };
    let turn = raw_turn.parse::<Turn>().map_err(|_| {
        warn!(relay = id, turn = raw_turn, "invalid turn value");
        DeviceError::malformed(format!(
            "invalid turn value '{raw_turn}', expected on, off or toggle"
        ))
    })?;
    if let Some(timer) = args.get("timer") {
        info!(relay = id, timer, "relay timer is not supported; ignoring");
    }

    let command = match turn {
        Turn::On | Turn::Off => Command::new(
            ComponentKind::Switch,
            Some(id),
            SwitchOperation::Set.to_string(),
        )
        .with_arg("on", (turn == Turn::On).to_string()),
        Turn::Toggle => Command::new(
            ComponentKind::Switch,
            Some(id),
            SwitchOperation::Toggle.to_string(),
        ),
    };
    Ok(command.with_arg("id", id.to_string()).via(Convention::Relay))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DeviceRegistry;
    use crate::router::parse_target;
    use serde_json::json;

    #[test]
    fn turn_values_map_to_switch_operations() {
        let on = parse_target("/relay/0?turn=on").expect("on");
        assert_eq!(on.operation, "Set");
        assert_eq!(on.args.get("on"), Some("true"));
        let off = parse_target("/relay/0?turn=off").expect("off");
        assert_eq!(off.args.get("on"), Some("false"));
        let toggle = parse_target("/relay/3?turn=toggle").expect("toggle");
        assert_eq!(toggle.operation, "Toggle");
        assert_eq!(toggle.id, Some(3));
    }

    #[test]
    fn bad_turn_is_a_structured_error() {
        let err = parse_target("/relay/0?turn=sideways").expect_err("bad turn");
        assert!(matches!(err, DeviceError::MalformedRequest(_)));
        assert!(err.to_body()["error"]
            .as_str()
            .is_some_and(|msg| msg.contains("sideways")));
        assert!(matches!(
            parse_target("/relay/0"),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_target("/relay/x?turn=on"),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_target("/relay?turn=on"),
            Err(DeviceError::MalformedRequest(_))
        ));
    }

    #[test]
    fn both_grammars_reach_the_same_state() {
        let mut legacy = DeviceRegistry::default();
        let mut structured = DeviceRegistry::default();
        let a = legacy.handle("/relay/0?turn=on").expect("legacy on");
        let b = structured
            .handle("/rpc/Switch.Set?id=0&on=true")
            .expect("structured on");
        assert_eq!(a, b);
        assert_eq!(a, json!({ "was_on": false }));
        assert_eq!(
            legacy.handle("/rpc/Switch.GetStatus?id=0"),
            structured.handle("/rpc/Switch.GetStatus?id=0")
        );
    }

    #[test]
    fn legacy_toggle_matches_structured_toggle() {
        let mut legacy = DeviceRegistry::default();
        let mut structured = DeviceRegistry::default();
        legacy.handle("/relay/2?turn=toggle").expect("legacy toggle");
        structured
            .handle("/rpc/Switch.Toggle?id=2")
            .expect("structured toggle");
        let status = legacy.handle("/rpc/Switch.GetStatus?id=2").expect("status");
        assert_eq!(status["output"], "ON");
        assert_eq!(
            Ok(status),
            structured.handle("/rpc/Switch.GetStatus?id=2")
        );
    }

    #[test]
    fn legacy_out_of_range_is_component_id_not_found() {
        let mut registry = DeviceRegistry::default();
        assert!(matches!(
            registry.handle("/relay/99?turn=on"),
            Err(DeviceError::ComponentIdNotFound { id: Some(99), .. })
        ));
    }

    #[test]
    fn negative_relay_index_is_out_of_range() {
        let mut registry = DeviceRegistry::default();
        let err = registry.handle("/relay/-1?turn=on").expect_err("negative index");
        assert_eq!(
            err,
            DeviceError::ComponentIdNotFound {
                kind: ComponentKind::Switch,
                id: Some(-1)
            }
        );
        assert_eq!(err.to_body(), json!({ "error": "component id not found", "id": -1 }));
        assert!(registry
            .switch(0)
            .is_some_and(|switch| !switch.output().is_on()));
    }

    #[test]
    fn timer_argument_is_ignored() {
        let mut registry = DeviceRegistry::default();
        assert_eq!(
            registry.handle("/relay/1?turn=on&timer=30"),
            Ok(json!({ "was_on": false }))
        );
    }
}
