//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Component dispatch engine for the emulated relay device."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use relay_emu_common::QueryError;
use serde_json::{json, Value};

use crate::kind::ComponentKind;

/// Errors recovered at the router/registry boundary and turned into a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The component exists but has no operation with this name.
    #[error("{kind} has no operation '{operation}'")]
    OperationNotFound {
        kind: ComponentKind,
        operation: String,
    },
    /// Recognised operation that the emulator deliberately stubs.
    #[error("{kind}.{operation} is not implemented")]
    NotImplemented {
        kind: ComponentKind,
        operation: String,
    },
    /// The id is outside the configured instance range for the kind, or missing
    /// for a kind that needs one.
    #[error("{kind} component id {} not found", display_id(.id))]
    ComponentIdNotFound {
        kind: ComponentKind,
        id: Option<i64>,
    },
    /// The path does not name a known component kind.
    #[error("component '{0}' not found")]
    ComponentNotFound(String),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// `KVS.Get` on an absent key.
    #[error("key not found: {0}")]
    KeyNotFound(String),
}

impl DeviceError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DeviceError::MalformedRequest(reason.into())
    }

    /// JSON body sent to the client for this error.
    pub fn to_body(&self) -> Value {
        match self {
            DeviceError::OperationNotFound { .. } => json!({ "error": "invalid operation" }),
            DeviceError::NotImplemented { .. } => json!({ "error": "not implemented (yet)" }),
            DeviceError::ComponentIdNotFound { id, .. } => {
                json!({ "error": "component id not found", "id": id })
            }
            DeviceError::ComponentNotFound(_) => json!({ "error": "Component not found" }),
            DeviceError::MalformedRequest(_) | DeviceError::KeyNotFound(_) => {
                json!({ "error": self.to_string() })
            }
        }
    }

    /// Short label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceError::OperationNotFound { .. } => "operation_not_found",
            DeviceError::NotImplemented { .. } => "not_implemented",
            DeviceError::ComponentIdNotFound { .. } => "component_id_not_found",
            DeviceError::ComponentNotFound(_) => "component_not_found",
            DeviceError::MalformedRequest(_) => "malformed_request",
            DeviceError::KeyNotFound(_) => "key_not_found",
        }
    }
}

impl From<QueryError> for DeviceError {
    fn from(err: QueryError) -> Self {
        DeviceError::MalformedRequest(err.to_string())
    }
}

fn display_id(id: &Option<i64>) -> String {
    id.map_or_else(|| "<none>".to_owned(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_use_wire_strings() {
        let op = DeviceError::OperationNotFound {
            kind: ComponentKind::Switch,
            operation: "Explode".into(),
        };
        assert_eq!(op.to_body(), json!({ "error": "invalid operation" }));
        assert!(op.to_string().contains("Explode"));

        let stub = DeviceError::NotImplemented {
            kind: ComponentKind::Input,
            operation: "Trigger".into(),
        };
        assert_eq!(stub.to_body(), json!({ "error": "not implemented (yet)" }));

        let missing = DeviceError::ComponentIdNotFound {
            kind: ComponentKind::Switch,
            id: Some(99),
        };
        assert_eq!(
            missing.to_body(),
            json!({ "error": "component id not found", "id": 99 })
        );
        assert_ne!(missing.to_body(), op.to_body());
    }

    #[test]
    fn absent_id_is_rendered() {
        let err = DeviceError::ComponentIdNotFound {
            kind: ComponentKind::Input,
            id: None,
        };
        assert_eq!(err.to_string(), "Input component id <none> not found");
        assert_eq!(err.to_body()["id"], Value::Null);
    }
}
