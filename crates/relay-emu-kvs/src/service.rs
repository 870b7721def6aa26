//! ---
//! emu_section: "02-versioned-store"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Versioned key-value store primitive and standalone service dispatch."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::collections::BTreeMap;
use std::str::FromStr;

use relay_emu_common::{split_target, QueryArgs};
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::error::KvsError;
use crate::store::{DeleteOutcome, EntryView, SetOutcome, VersionedStore};

/// Operations addressable on the standalone service as `/<operation>?...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum StoreOperation {
    #[strum(serialize = "get")]
    Get,
    #[strum(serialize = "set")]
    Set,
    #[strum(serialize = "delete")]
    Delete,
    #[strum(serialize = "listall")]
    ListAll,
}

/// Body of a successful standalone-service response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoreResponse {
    Set(SetOutcome),
    Entry(EntryView),
    Deleted(DeleteOutcome),
    Listing(BTreeMap<String, EntryView>),
}

/// The store exposed with its own addressing: `/set`, `/get`, `/delete`, `/listall`.
#[derive(Debug, Default)]
pub struct KvsService {
    store: VersionedStore,
}

impl KvsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &VersionedStore {
        &self.store
    }

    /// Dispatch a raw request target such as `/set?key=a&value=1`.
    ///
    /// The operation is validated before the query is parsed, so an unknown
    /// operation is always reported as [`KvsError::InvalidOperation`].
    pub fn call(&mut self, target: &str) -> Result<StoreResponse, KvsError> {
        let (path, query) = split_target(target);
        let name = path.strip_prefix('/').unwrap_or(path);
        let operation = StoreOperation::from_str(name).map_err(|_| {
            warn!(operation = name, "kvs service: invalid operation");
            KvsError::InvalidOperation(name.to_owned())
        })?;
        let args = QueryArgs::parse(query).inspect_err(|err| {
            warn!(error = %err, "kvs service: malformed query");
        })?;
        self.execute(operation, &args)
    }

    pub fn execute(
        &mut self,
        operation: StoreOperation,
        args: &QueryArgs,
    ) -> Result<StoreResponse, KvsError> {
        match operation {
            StoreOperation::Set => {
                let key = require_key(args)?;
                let value = args
                    .get("value")
                    .or_else(|| args.get("val"))
                    .ok_or(KvsError::MissingArgument("value"))?;
                Ok(StoreResponse::Set(self.store.set(key, value)))
            }
            StoreOperation::Get => {
                let key = require_key(args)?;
                self.store.get(key).map(StoreResponse::Entry).inspect_err(|_| {
                    warn!(key, "kvs service: key not found");
                })
            }
            StoreOperation::Delete => {
                let key = require_key(args)?;
                Ok(StoreResponse::Deleted(self.store.delete(key)))
            }
            StoreOperation::ListAll => {
                if let Some(filter) = args.get("filter") {
                    debug!(filter, "kvs listall filter is not supported; ignoring");
                }
                Ok(StoreResponse::Listing(self.store.list_all()))
            }
        }
    }
}

fn require_key(args: &QueryArgs) -> Result<&str, KvsError> {
    args.get("key").ok_or(KvsError::MissingArgument("key"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(response: StoreResponse) -> serde_json::Value {
        serde_json::to_value(response).expect("serialize")
    }

    #[test]
    fn set_get_delete_round() {
        let mut service = KvsService::new();
        assert_eq!(
            body(service.call("/set?key=a&value=1").expect("set")),
            json!({ "version": 0 })
        );
        assert_eq!(
            body(service.call("/set?key=a&val=2").expect("set via alias")),
            json!({ "version": 1 })
        );
        assert_eq!(
            body(service.call("/get?key=a").expect("get")),
            json!({ "value": "2", "version": 1 })
        );
        assert_eq!(
            body(service.call("/delete?key=a").expect("delete")),
            json!({ "lastversion": 1 })
        );
        assert_eq!(
            service.call("/get?key=a"),
            Err(KvsError::KeyNotFound("a".into()))
        );
    }

    #[test]
    fn delete_of_missing_key_returns_sentinel() {
        let mut service = KvsService::new();
        assert_eq!(
            body(service.call("/delete?key=missing").expect("delete")),
            json!({ "version": -1 })
        );
    }

    #[test]
    fn unknown_operation_is_rejected_before_query_parsing() {
        let mut service = KvsService::new();
        assert_eq!(
            service.call("/frobnicate?not-a-pair"),
            Err(KvsError::InvalidOperation("frobnicate".into()))
        );
        assert_eq!(
            service.call("/SET?key=a&value=1"),
            Err(KvsError::InvalidOperation("SET".into()))
        );
        assert!(service.store().is_empty());
    }

    #[test]
    fn listall_ignores_filter() {
        let mut service = KvsService::new();
        service.call("/set?key=a&value=1").expect("set");
        service.call("/set?key=b&value=2").expect("set");
        assert_eq!(
            body(service.call("/listall?filter=%5Ea").expect("listall")),
            json!({
                "a": { "value": "1", "version": 0 },
                "b": { "value": "2", "version": 0 },
            })
        );
        assert_eq!(
            body(service.call("/listall").expect("listall without query")),
            body(service.call("/listall?").expect("listall with empty query"))
        );
    }

    #[test]
    fn escaped_values_survive() {
        let mut service = KvsService::new();
        service
            .call("/set?key=escape_test_key&value=here+are+%22some%22+embedded+quotes+%26+stuff")
            .expect("set");
        assert_eq!(
            body(service.call("/get?key=escape_test_key").expect("get")),
            json!({ "value": "here are \"some\" embedded quotes & stuff", "version": 0 })
        );
    }

    #[test]
    fn missing_arguments_are_reported() {
        let mut service = KvsService::new();
        assert_eq!(
            service.call("/set?key=a"),
            Err(KvsError::MissingArgument("value"))
        );
        assert_eq!(service.call("/get"), Err(KvsError::MissingArgument("key")));
        assert!(matches!(
            service.call("/get?key"),
            Err(KvsError::MalformedQuery(_))
        ));
    }
}
