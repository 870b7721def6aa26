//! ---
//! emu_section: "05-networking-external-interfaces"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "HTTP surfaces for the device and the standalone store."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use relay_emu_device::{parse_target, DeviceError, DeviceRegistry};
use relay_emu_metrics::{render, EmulatorMetrics};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::server::{self, ApiServer};

const SURFACE: &str = "device";

/// Shared state behind the device surface.
///
/// Requests are parsed outside the lock; only dispatch against the registry
/// is serialized, so a read never observes a half-applied mutation.
#[derive(Debug)]
pub struct DeviceState {
    registry: Mutex<DeviceRegistry>,
    metrics: Option<EmulatorMetrics>,
}

impl DeviceState {
    pub fn new(registry: DeviceRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: EmulatorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Parse and execute one request target, returning the response body.
    pub fn handle(&self, target: &str) -> Result<Value, DeviceError> {
        let command = match parse_target(target) {
            Ok(command) => command,
            Err(err) => {
                self.record("unknown", err.label());
                return Err(err);
            }
        };
        let result = self.registry.lock().execute(&command);
        let outcome = result.as_ref().map_or_else(DeviceError::label, |_| "ok");
        self.record(command.kind.as_str(), outcome);
        result
    }

    /// Run `f` against the registry while holding the lock.
    pub fn with_registry<R>(&self, f: impl FnOnce(&DeviceRegistry) -> R) -> R {
        f(&self.registry.lock())
    }

    fn record(&self, component: &str, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_request(SURFACE, component, outcome);
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(DeviceRegistry::default())
    }
}

/// Router for the device surface. Every path not claimed by a fixed route is
/// treated as a component target.
pub fn device_router(state: Arc<DeviceState>) -> Router {
    let mut router = Router::new().route("/favicon.ico", get(no_content));
    if let Some(metrics) = &state.metrics {
        let registry = metrics.registry();
        router = router.route(
            "/metrics",
            get(move || {
                let registry = registry.clone();
                async move { render(&registry) }
            }),
        );
    }
    router.fallback(dispatch).with_state(state)
}

pub fn spawn_device_server(state: Arc<DeviceState>, addr: SocketAddr) -> Result<ApiServer> {
    server::spawn("device", device_router(state), addr)
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn dispatch(State(state): State<Arc<DeviceState>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        warn!(%method, %uri, "unsupported method");
        return ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    }
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    match state.handle(target) {
        Ok(body) => {
            debug!(request = target, "request served");
            Json(body).into_response()
        }
        Err(err) => {
            debug!(request = target, error = %err, "request rejected");
            ApiError::from(&err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_emu_device::BinaryState;
    use relay_emu_metrics::new_registry;
    use serde_json::json;

    async fn get_json(addr: SocketAddr, target: &str) -> (u16, Value) {
        let response = reqwest::get(format!("http://{addr}{target}"))
            .await
            .expect("request");
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.expect("json body");
        (status, body)
    }

    #[tokio::test]
    async fn switch_set_then_status_over_http() {
        let state = Arc::new(DeviceState::default());
        let server =
            spawn_device_server(state.clone(), "127.0.0.1:0".parse().expect("addr")).expect("spawn");
        let addr = server.addr();

        assert_eq!(
            get_json(addr, "/rpc/Switch.Set?id=0&on=true").await,
            (200, json!({ "was_on": false }))
        );
        let (status, body) = get_json(addr, "/rpc/Switch.GetStatus?id=0").await;
        assert_eq!(status, 200);
        assert_eq!(body["output"], "ON");
        assert_eq!(
            state.with_registry(|registry| registry.switch(0).map(|s| s.output())),
            Some(BinaryState::On)
        );

        server.shutdown().await.expect("shutdown");
    }

    #[tokio::test]
    async fn errors_keep_the_server_alive() {
        let server = spawn_device_server(
            Arc::new(DeviceState::default()),
            "127.0.0.1:0".parse().expect("addr"),
        )
        .expect("spawn");
        let addr = server.addr();

        assert_eq!(
            get_json(addr, "/rpc/Switch.Explode?id=0").await,
            (404, json!({ "error": "invalid operation" }))
        );
        assert_eq!(
            get_json(addr, "/rpc/Switch.GetStatus?id=99").await,
            (404, json!({ "error": "component id not found", "id": 99 }))
        );
        assert_eq!(
            get_json(addr, "/rpc/Input.Trigger?id=0").await,
            (501, json!({ "error": "not implemented (yet)" }))
        );
        assert_eq!(
            get_json(addr, "/rpc/Light.Set").await,
            (404, json!({ "error": "Component not found" }))
        );
        let (status, _) = get_json(addr, "/relay/0?turn=sideways").await;
        assert_eq!(status, 400);
        let (status, body) = get_json(addr, "/rpc/Sys.GetStatus").await;
        assert_eq!(status, 200);
        assert!(body.is_object());

        server.shutdown().await.expect("shutdown");
    }

    #[tokio::test]
    async fn favicon_and_methods() {
        let server = spawn_device_server(
            Arc::new(DeviceState::default()),
            "127.0.0.1:0".parse().expect("addr"),
        )
        .expect("spawn");
        let client = reqwest::Client::new();
        let favicon = client
            .get(format!("http://{}/favicon.ico", server.addr()))
            .send()
            .await
            .expect("favicon");
        assert_eq!(favicon.status().as_u16(), 204);
        let post = client
            .post(format!("http://{}/rpc/Switch.Toggle?id=0", server.addr()))
            .send()
            .await
            .expect("post");
        assert_eq!(post.status().as_u16(), 405);
        server.shutdown().await.expect("shutdown");
    }

    #[test]
    fn outcomes_are_counted() {
        let metrics = EmulatorMetrics::new(new_registry()).expect("metrics");
        let state = DeviceState::default().with_metrics(metrics.clone());
        state.handle("/rpc/Switch.Toggle?id=1").expect("toggle");
        let _ = state.handle("/rpc/Switch.Toggle?id=7");
        let _ = state.handle("/rpc/Nope.Get");
        assert_eq!(metrics.request_count("device", "Switch", "ok"), 1);
        assert_eq!(
            metrics.request_count("device", "Switch", "component_id_not_found"),
            1
        );
        assert_eq!(
            metrics.request_count("device", "unknown", "component_not_found"),
            1
        );
    }
}
