//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Component dispatch engine for the emulated relay device."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use relay_emu_common::QueryArgs;
use strum::{Display, IntoStaticStr};

use crate::kind::ComponentKind;

/// Addressing grammar a command was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Convention {
    /// `/rpc/<Kind>.<Operation>?id=N&...`
    Structured,
    /// `/relay/<id>?turn=on|off|toggle`
    Relay,
}

/// A request reduced to what the registry needs: which instance, which
/// operation, which arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: ComponentKind,
    /// Requested instance index as sent by the client; range is checked by
    /// the registry.
    pub id: Option<i64>,
    pub operation: String,
    pub args: QueryArgs,
    pub convention: Convention,
}

impl Command {
    pub fn new(kind: ComponentKind, id: Option<i64>, operation: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            operation: operation.into(),
            args: QueryArgs::new(),
            convention: Convention::Structured,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key, value);
        self
    }

    pub fn with_args(mut self, args: QueryArgs) -> Self {
        self.args = args;
        self
    }

    pub fn via(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }
}
