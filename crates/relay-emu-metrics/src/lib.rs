//! ---
//! emu_section: "04-observability"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Metrics collection and export utilities."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder, TEXT_FORMAT,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared registry type used across services.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Render the registry in the Prometheus text format.
pub fn render(registry: &Registry) -> Response {
    let families = registry.gather();
    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&families) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(TEXT_FORMAT),
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics encoding error"),
            )
                .into_response()
        }
    }
}

/// Spawn a dedicated HTTP server that exposes the registry at `/metrics`.
pub fn spawn_http_server(registry: SharedRegistry, addr: SocketAddr) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let registry = registry.clone();
            async move { render(&registry) }
        }),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {addr}"))?;
    std_listener
        .set_nonblocking(true)
        .context("failed to configure metrics listener as non-blocking")?;
    let local_addr = std_listener
        .local_addr()
        .context("failed to read metrics listener address")?;
    let listener = TcpListener::from_std(std_listener)
        .context("failed to convert std listener into tokio listener")?;

    info!(address = %local_addr, "metrics server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

/// Handle to the running HTTP exporter.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    /// Return the bound address for convenience.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}

/// Request accounting for the device and store surfaces.
#[derive(Clone)]
pub struct EmulatorMetrics {
    registry: SharedRegistry,
    requests: IntCounterVec,
    kvs_keys: IntGauge,
}

impl EmulatorMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new(
                "relay_emu_requests_total",
                "Requests handled by surface, component kind and outcome",
            ),
            &["surface", "component", "outcome"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let kvs_keys = IntGauge::with_opts(Opts::new(
            "relay_emu_kvs_keys",
            "Keys currently held by the standalone versioned store",
        ))?;
        registry.register(Box::new(kvs_keys.clone()))?;

        Ok(Self {
            registry,
            requests,
            kvs_keys,
        })
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn record_request(&self, surface: &str, component: &str, outcome: &str) {
        self.requests
            .with_label_values(&[surface, component, outcome])
            .inc();
    }

    pub fn set_kvs_keys(&self, count: usize) {
        self.kvs_keys.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn request_count(&self, surface: &str, component: &str, outcome: &str) -> u64 {
        self.requests
            .with_label_values(&[surface, component, outcome])
            .get()
    }
}

impl std::fmt::Debug for EmulatorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulatorMetrics")
            .field("kvs_keys", &self.kvs_keys.get())
            .finish_non_exhaustive()
    }
}

pub use prometheus;
