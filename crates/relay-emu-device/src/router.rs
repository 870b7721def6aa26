//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Request routing from raw targets to normalized commands."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
//! Lowers a raw request target (`path?query`) into a [`Command`].
//!
//! Structured grammar: `[/rpc]/<Kind>.<Operation>?id=N&k=v...`. The kind is
//! the first path segment before the dot and the operation is everything
//! after it. Targets under `/relay/` are handed to the relay adapter.

use std::str::FromStr;

use relay_emu_common::{split_target, QueryArgs};
use tracing::warn;

use crate::command::{Command, Convention};
use crate::error::DeviceError;
use crate::kind::ComponentKind;
use crate::relay;

/// Optional namespace in front of structured targets.
pub const RPC_PREFIX: &str = "/rpc";

/// Parse either addressing grammar into a [`Command`].
pub fn parse_target(target: &str) -> Result<Command, DeviceError> {
    let (path, query) = split_target(target);
    let args = QueryArgs::parse(query).inspect_err(|err| {
        warn!(request = target, error = %err, "unparsable query string");
    })?;
    let path = strip_rpc_prefix(path);

    if let Some(rest) = relay::strip_relay_prefix(path) {
        return relay::lower(rest, args);
    }
    parse_structured(path, args)
}

fn strip_rpc_prefix(path: &str) -> &str {
    match path.strip_prefix(RPC_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

fn parse_structured(path: &str, args: QueryArgs) -> Result<Command, DeviceError> {
    let method = path.strip_prefix('/').unwrap_or(path);
    if method.is_empty() || method.contains('/') {
        warn!(path, "no component addressed");
        return Err(DeviceError::ComponentNotFound(method.to_owned()));
    }
    // `Switch` with no operation still resolves the kind so the id is checked
    // first; the empty operation then fails as an unknown operation.
    let (kind_name, operation) = method.split_once('.').unwrap_or((method, ""));
    let kind = ComponentKind::from_str(kind_name).map_err(|_| {
        warn!(component = kind_name, "component not found");
        DeviceError::ComponentNotFound(kind_name.to_owned())
    })?;
    let id = parse_id(&args)?;

    Ok(Command::new(kind, id, operation)
        .with_args(args)
        .via(Convention::Structured))
}

/// Read the optional `id` argument as an instance index.
///
/// Any integer is accepted; whether it names an instance is decided by the
/// registry. Only text that is not an integer is malformed.
pub(crate) fn parse_id(args: &QueryArgs) -> Result<Option<i64>, DeviceError> {
    args.get("id")
        .map(|raw| {
            parse_index(raw)
                .ok_or_else(|| DeviceError::malformed(format!("id '{raw}' is not an integer")))
        })
        .transpose()
}

/// Parse a decimal integer index. Values beyond `i64` saturate, which keeps
/// them out of range for every kind.
pub(crate) fn parse_index(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(index) = raw.parse::<i64>() {
        return Some(index);
    }
    let (saturated, digits) = match raw.strip_prefix('-') {
        Some(digits) => (i64::MIN, digits),
        None => (i64::MAX, raw.strip_prefix('+').unwrap_or(raw)),
    };
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(saturated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_target_with_prefix() {
        let command = parse_target("/rpc/Switch.Set?id=2&on=true").expect("parse");
        assert_eq!(command.kind, ComponentKind::Switch);
        assert_eq!(command.id, Some(2));
        assert_eq!(command.operation, "Set");
        assert_eq!(command.args.get("on"), Some("true"));
        assert_eq!(command.convention, Convention::Structured);
    }

    #[test]
    fn prefix_is_optional() {
        let with = parse_target("/rpc/Input.GetStatus?id=1").expect("with prefix");
        let without = parse_target("/Input.GetStatus?id=1").expect("without prefix");
        assert_eq!(with, without);
    }

    #[test]
    fn singleton_without_id() {
        let command = parse_target("/rpc/Sys.GetStatus").expect("parse");
        assert_eq!(command.kind, ComponentKind::System);
        assert_eq!(command.id, None);
        assert!(command.args.is_empty());
    }

    #[test]
    fn kvs_values_are_decoded() {
        let command = parse_target("/rpc/KVS.Set?key=greeting&value=hello%20world").expect("parse");
        assert_eq!(command.kind, ComponentKind::Kvs);
        assert_eq!(command.args.get("value"), Some("hello world"));
    }

    #[test]
    fn unknown_kind() {
        assert_eq!(
            parse_target("/rpc/Light.Set?id=0"),
            Err(DeviceError::ComponentNotFound("Light".into()))
        );
        assert!(matches!(
            parse_target("/"),
            Err(DeviceError::ComponentNotFound(_))
        ));
        assert!(matches!(
            parse_target("/rpc"),
            Err(DeviceError::ComponentNotFound(_))
        ));
        assert!(matches!(
            parse_target("/rpcSwitch.Set"),
            Err(DeviceError::ComponentNotFound(_))
        ));
    }

    #[test]
    fn missing_operation_keeps_kind() {
        let command = parse_target("/rpc/Switch?id=0").expect("parse");
        assert_eq!(command.kind, ComponentKind::Switch);
        assert_eq!(command.operation, "");
    }

    #[test]
    fn malformed_inputs() {
        assert!(matches!(
            parse_target("/rpc/Switch.GetStatus?id=zero"),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_target("/rpc/Switch.GetStatus?id=1.5"),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_target("/rpc/Switch.GetStatus?id=-"),
            Err(DeviceError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_target("/rpc/Switch.GetStatus?id"),
            Err(DeviceError::MalformedRequest(_))
        ));
    }

    #[test]
    fn any_integer_is_an_index() {
        assert_eq!(parse_target("/rpc/Switch.GetStatus?id=-1").expect("negative").id, Some(-1));
        assert_eq!(parse_target("/rpc/Switch.GetStatus?id=+4").expect("signed").id, Some(4));
        assert_eq!(
            parse_target("/rpc/Switch.GetStatus?id=18446744073709551616")
                .expect("huge")
                .id,
            Some(i64::MAX)
        );
        assert_eq!(parse_index("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_index("0x10"), None);
    }

    #[test]
    fn relay_targets_are_delegated() {
        let command = parse_target("/relay/1?turn=toggle").expect("parse");
        assert_eq!(command.convention, Convention::Relay);
        assert_eq!(command.kind, ComponentKind::Switch);
        let prefixed = parse_target("/rpc/relay/1?turn=toggle").expect("parse");
        assert_eq!(command, prefixed);
    }
}
