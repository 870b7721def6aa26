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
use relay_emu_kvs::{DeleteOutcome, KvsError, VersionedStore};
use serde_json::{json, Map, Value};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use super::{acknowledge_config, not_implemented, require_arg, Component, OpResult};
use crate::error::DeviceError;
use crate::kind::ComponentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum KvsOperation {
    Set,
    Get,
    GetMany,
    List,
    Delete,
    GetConfig,
    SetConfig,
    GetStatus,
}

/// The device's embedded key-value store.
///
/// Same [`VersionedStore`] and same semantics as the standalone store service;
/// only the addressing differs.
#[derive(Debug, Clone, Default)]
pub struct KvsComponent {
    store: VersionedStore,
}

impl KvsComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    fn set(&mut self, args: &QueryArgs) -> OpResult {
        let key = require_arg(args, "key")?;
        let value = args
            .get("value")
            .or_else(|| args.get("val"))
            .ok_or_else(|| DeviceError::malformed("missing required argument 'value'"))?;
        let outcome = self.store.set(key, value);
        Ok(json!({ "version": outcome.version }))
    }

    fn get(&self, args: &QueryArgs) -> OpResult {
        let key = require_arg(args, "key")?;
        match self.store.get(key) {
            Ok(view) => Ok(json!({ "value": view.value, "version": view.version })),
            Err(KvsError::KeyNotFound(key)) => {
                warn!(key = %key, "KVS.Get on absent key");
                Err(DeviceError::KeyNotFound(key))
            }
            Err(other) => Err(DeviceError::malformed(other.to_string())),
        }
    }

    fn delete(&mut self, args: &QueryArgs) -> OpResult {
        let key = require_arg(args, "key")?;
        Ok(match self.store.delete(key) {
            DeleteOutcome::Removed { lastversion } => json!({ "lastversion": lastversion }),
            DeleteOutcome::Absent { version } => json!({ "version": version }),
        })
    }

    fn list(&self, args: &QueryArgs) -> OpResult {
        if let Some(filter) = args.get("filter").or_else(|| args.get("match")) {
            debug!(filter, "KVS.List filter is not supported; ignoring");
        }
        let listing: Map<String, Value> = self
            .store
            .list_all()
            .into_iter()
            .map(|(key, view)| {
                (
                    key,
                    json!({ "value": view.value, "version": view.version }),
                )
            })
            .collect();
        Ok(Value::Object(listing))
    }
}

impl Component for KvsComponent {
    type Operation = KvsOperation;

    const KIND: ComponentKind = ComponentKind::Kvs;

    fn get_config(&self, _args: &QueryArgs) -> OpResult {
        Ok(json!({}))
    }

    fn set_config(&mut self, args: &QueryArgs) -> OpResult {
        Ok(acknowledge_config(Self::KIND, None, args))
    }

    fn get_status(&self, _args: &QueryArgs) -> OpResult {
        Ok(json!({ "items": self.store.len() }))
    }

    fn invoke(&mut self, operation: KvsOperation, args: &QueryArgs) -> OpResult {
        match operation {
            KvsOperation::Set => self.set(args),
            KvsOperation::Get => self.get(args),
            KvsOperation::Delete => self.delete(args),
            KvsOperation::List => self.list(args),
            KvsOperation::GetMany => not_implemented(Self::KIND, operation),
            KvsOperation::GetConfig => self.get_config(args),
            KvsOperation::SetConfig => self.set_config(args),
            KvsOperation::GetStatus => self.get_status(args),
        }
    }
}
