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

use super::{acknowledge_config, Component, OpResult};
use crate::kind::ComponentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum SystemOperation {
    GetConfig,
    SetConfig,
    GetStatus,
}

/// Device-wide system block with canned documents.
///
/// The config document lists every key with a `null` value (present but not
/// populated); the status document carries plausible firmware and network
/// fields. Both are returned whole.
#[derive(Debug, Clone)]
pub struct SystemComponent {
    config: Value,
    status: Value,
}

impl SystemComponent {
    pub fn new() -> Self {
        Self {
            config: canned_config(),
            status: canned_status(),
        }
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn status(&self) -> &Value {
        &self.status
    }
}

impl Default for SystemComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SystemComponent {
    type Operation = SystemOperation;

    const KIND: ComponentKind = ComponentKind::System;

    fn get_config(&self, _args: &QueryArgs) -> OpResult {
        Ok(self.config.clone())
    }

    fn set_config(&mut self, args: &QueryArgs) -> OpResult {
        Ok(acknowledge_config(Self::KIND, None, args))
    }

    fn get_status(&self, _args: &QueryArgs) -> OpResult {
        Ok(self.status.clone())
    }

    fn invoke(&mut self, operation: SystemOperation, args: &QueryArgs) -> OpResult {
        match operation {
            SystemOperation::GetConfig => self.get_config(args),
            SystemOperation::SetConfig => self.set_config(args),
            SystemOperation::GetStatus => self.get_status(args),
        }
    }
}

fn canned_config() -> Value {
    json!({
        "device": {
            "name": null,
            "eco_mode": null,
            "mac": null,
            "fw_id": null,
            "profile": null,
            "discoverable": null,
            "addon_type": null,
            "sys_btn_toggle": null,
        },
        "location": {
            "tz": null,
            "lat": null,
            "lon": null,
        },
        "debug": {
            "mqtt": null,
            "websocket": null,
            "udp": null,
        },
        "cfg_rev": null,
    })
}

fn canned_status() -> Value {
    json!({
        "mac": "DEADBEEFD00D",
        "restart_required": false,
        "time": "00:00",
        "unixtime": 1_654_694_407,
        "last_sync_ts": 1_654_694_307,
        "uptime": 1000,
        "ram_size": 253_464,
        "ram_free": 146_012,
        "fs_size": 458_752,
        "fs_free": 212_992,
        "cfg_rev": 10,
        "kvs_rev": 277,
        "schedule_rev": 0,
        "webhook_rev": 0,
        "btrelay_rev": 0,
        "available_updates": {
            "stable": {
                "version": "0.10.2",
            },
        },
    })
}
