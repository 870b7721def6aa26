//! ---
//! emu_section: "05-networking-external-interfaces"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "HTTP surfaces for the device and the standalone store."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Handle to a running HTTP surface.
#[derive(Debug)]
pub struct ApiServer {
    name: &'static str,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    /// Address actually bound (resolves port `0`).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Bind `addr` and serve `router` on a background task.
pub(crate) fn spawn(name: &'static str, router: Router, addr: SocketAddr) -> Result<ApiServer> {
    let router = router.layer(TraceLayer::new_for_http());

    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind {name} listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .with_context(|| format!("failed to configure {name} listener as non-blocking"))?;
    let local_addr = listener
        .local_addr()
        .with_context(|| format!("failed to read {name} listener address"))?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let task: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(server = name, address = %local_addr, "listening");
        if let Err(err) = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(server = name, address = %local_addr, error = %err, "server exited with error");
            return Err(err.into());
        }
        Ok(())
    });

    Ok(ApiServer {
        name,
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task,
    })
}
