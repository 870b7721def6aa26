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
use relay_emu_kvs::{KvsError, KvsService, StoreResponse};
use relay_emu_metrics::EmulatorMetrics;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::server::{self, ApiServer};

const SURFACE: &str = "kvs";

/// Shared state behind the standalone store surface.
#[derive(Debug, Default)]
pub struct StoreState {
    service: Mutex<KvsService>,
    metrics: Option<EmulatorMetrics>,
}

impl StoreState {
    pub fn new(service: KvsService) -> Self {
        Self {
            service: Mutex::new(service),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: EmulatorMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn handle(&self, target: &str) -> Result<StoreResponse, KvsError> {
        let mut service = self.service.lock();
        let result = service.call(target);
        if let Some(metrics) = &self.metrics {
            let outcome = result.as_ref().map_or_else(KvsError::label, |_| "ok");
            metrics.record_request(SURFACE, "KVS", outcome);
            metrics.set_kvs_keys(service.store().len());
        }
        result
    }

    pub fn key_count(&self) -> usize {
        self.service.lock().store().len()
    }
}

pub fn kvs_router(state: Arc<StoreState>) -> Router {
    Router::new()
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .fallback(dispatch)
        .with_state(state)
}

pub fn spawn_kvs_server(state: Arc<StoreState>, addr: SocketAddr) -> Result<ApiServer> {
    server::spawn("kvs", kvs_router(state), addr)
}

async fn dispatch(State(state): State<Arc<StoreState>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        warn!(%method, %uri, "unsupported method");
        return ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    }
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    match state.handle(target) {
        Ok(body) => Json(body).into_response(),
        Err(err) => {
            debug!(request = target, error = %err, "kvs request rejected");
            ApiError::from(&err).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn get_json(addr: SocketAddr, target: &str) -> (u16, Value) {
        let response = reqwest::get(format!("http://{addr}{target}"))
            .await
            .expect("request");
        let status = response.status().as_u16();
        (status, response.json::<Value>().await.expect("json body"))
    }

    #[tokio::test]
    async fn versions_over_http() {
        let state = Arc::new(StoreState::default());
        let server =
            spawn_kvs_server(state.clone(), "127.0.0.1:0".parse().expect("addr")).expect("spawn");
        let addr = server.addr();

        assert_eq!(get_json(addr, "/set?key=a&value=1").await, (200, json!({ "version": 0 })));
        assert_eq!(get_json(addr, "/set?key=a&value=2").await, (200, json!({ "version": 1 })));
        assert_eq!(
            get_json(addr, "/get?key=a").await,
            (200, json!({ "value": "2", "version": 1 }))
        );
        assert_eq!(
            get_json(addr, "/listall").await,
            (200, json!({ "a": { "value": "2", "version": 1 } }))
        );
        assert_eq!(
            get_json(addr, "/delete?key=a").await,
            (200, json!({ "lastversion": 1 }))
        );
        assert_eq!(
            get_json(addr, "/delete?key=a").await,
            (200, json!({ "version": -1 }))
        );
        assert_eq!(state.key_count(), 0);

        server.shutdown().await.expect("shutdown");
    }

    #[test]
    fn shared_state_serializes_writers() {
        let state = StoreState::default();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        state.handle("/set?key=k&value=v").expect("set");
                    }
                });
            }
        });
        let entry = serde_json::to_value(state.handle("/get?key=k").expect("get")).expect("json");
        assert_eq!(entry["version"], 199);
        assert_eq!(state.key_count(), 1);
    }

    #[tokio::test]
    async fn client_errors() {
        let server = spawn_kvs_server(
            Arc::new(StoreState::default()),
            "127.0.0.1:0".parse().expect("addr"),
        )
        .expect("spawn");
        let addr = server.addr();
        let (status, body) = get_json(addr, "/frobnicate?key=a").await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().is_some_and(|m| m.contains("frobnicate")));
        let (status, _) = get_json(addr, "/get?key=missing").await;
        assert_eq!(status, 404);
        let (status, _) = get_json(addr, "/set?key=a").await;
        assert_eq!(status, 400);
        server.shutdown().await.expect("shutdown");
    }
}
