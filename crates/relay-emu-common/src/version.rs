//! ---
//! emu_section: "01-core-functionality"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Shared primitives and utilities for the emulator runtime."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use serde::Serialize;

/// Build metadata reported by `--version` and at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub semver: &'static str,
    pub profile: &'static str,
    pub target: String,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION"),
            profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
            target: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
        }
    }

    /// Single line form: `relay-emu 0.1.0 (release, x86_64-linux)`.
    pub fn extended(&self) -> String {
        format!("relay-emu {} ({}, {})", self.semver, self.profile, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_mentions_semver() {
        let info = VersionInfo::current();
        assert!(info.extended().contains(info.semver));
        assert!(info.extended().starts_with("relay-emu "));
    }
}
