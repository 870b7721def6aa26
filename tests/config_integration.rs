//! ---
//! emu_section: "15-testing-qa-runbook"
//! emu_subsection: "integration-tests"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Integration and validation tests for the relay emulator."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use relay_emu_common::{AppConfig, DeviceConfig};

fn read(path: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let full = Path::new(manifest_dir).join("..").join(path);
    fs::read_to_string(&full)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", full.display(), err))
}

#[test]
fn shipped_config_matches_reference_layout() {
    let config: AppConfig = read("configs/relay-emu.toml").parse().expect("parse config");
    assert_eq!(config.device, DeviceConfig::default());
    assert!(config.api.enabled);
    assert!(config.kvs.enabled);
    assert_ne!(config.api.listen, config.kvs.listen);
}

#[test]
fn config_files_carry_frontmatter() {
    let content = read("configs/relay-emu.toml");
    assert!(
        content.starts_with("# ---"),
        "configs/relay-emu.toml must include frontmatter header"
    );
}
