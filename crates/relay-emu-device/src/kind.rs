//! ---
//! emu_section: "03-device-core"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Component dispatch engine for the emulated relay device."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use strum::{Display, EnumString, IntoStaticStr};

/// Addressable component kinds, named as they appear in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ComponentKind {
    #[strum(to_string = "Input")]
    Input,
    #[strum(to_string = "Switch")]
    Switch,
    #[strum(to_string = "Sys")]
    System,
    #[strum(to_string = "KVS")]
    Kvs,
    #[strum(to_string = "Script", serialize = "Scripts")]
    Script,
}

impl ComponentKind {
    /// Singleton kinds may be addressed without an `id` argument.
    pub fn is_singleton(self) -> bool {
        matches!(self, ComponentKind::System | ComponentKind::Kvs)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
