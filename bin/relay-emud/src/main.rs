//! ---
//! emu_section: "01-core-functionality"
//! emu_subsection: "binary"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Binary entrypoint for the relay-emu daemon."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use relay_emu_api::{spawn_device_server, spawn_kvs_server, ApiServer, DeviceState, StoreState};
use relay_emu_common::{init_tracing, AppConfig, VersionInfo};
use relay_emu_device::DeviceRegistry;
use relay_emu_kvs::KvsService;
use relay_emu_metrics::{new_registry, spawn_http_server, EmulatorMetrics};
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Smart relay device emulator",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "ADDR", help = "Override the device listen address")]
    listen: Option<SocketAddr>,

    #[arg(
        long,
        value_name = "ADDR",
        help = "Override the standalone store listen address"
    )]
    kvs_listen: Option<SocketAddr>,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Commands {
    #[command(about = "Serve the device and the standalone store")]
    Run,
    #[command(about = "Serve only the emulated device")]
    Device,
    #[command(about = "Serve only the standalone store")]
    Kvs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let version = VersionInfo::current();
    if cli.version {
        println!("{}", version.extended());
        return Ok(());
    }

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/relay-emu.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(listen) = cli.listen {
        config.api.listen = listen;
    }
    if let Some(listen) = cli.kvs_listen {
        config.kvs.listen = listen;
    }
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {}
        Commands::Device => config.kvs.enabled = false,
        Commands::Kvs => config.api.enabled = false,
    }
    config.validate()?;

    let _log_guards = init_tracing("relay-emud", &config.logging)?;
    match &loaded.source {
        Some(path) => info!(config_path = %path.display(), version = version.semver, "configuration loaded"),
        None => info!(version = version.semver, "no configuration file; using defaults"),
    }

    run(config).await
}

async fn run(config: AppConfig) -> Result<()> {
    let (metrics, metrics_server) = if config.metrics.enabled {
        let metrics = EmulatorMetrics::new(new_registry())?;
        let server = spawn_http_server(metrics.registry(), config.metrics.listen)?;
        info!(address = %server.addr(), "metrics exporter enabled");
        (Some(metrics), Some(server))
    } else {
        info!("metrics exporter disabled by configuration");
        (None, None)
    };

    let mut servers: Vec<ApiServer> = Vec::new();

    if config.api.enabled {
        let mut state = DeviceState::new(DeviceRegistry::new(&config.device));
        if let Some(metrics) = &metrics {
            state = state.with_metrics(metrics.clone());
        }
        let server = spawn_device_server(Arc::new(state), config.api.listen)?;
        info!(
            address = %server.addr(),
            inputs = config.device.inputs,
            switches = config.device.switches,
            "device server listening"
        );
        servers.push(server);
    } else {
        info!("device server disabled");
    }

    if config.kvs.enabled {
        let mut state = StoreState::new(KvsService::new());
        if let Some(metrics) = &metrics {
            state = state.with_metrics(metrics.clone());
        }
        let server = spawn_kvs_server(Arc::new(state), config.kvs.listen)?;
        info!(address = %server.addr(), "store server listening");
        servers.push(server);
    } else {
        info!("store server disabled");
    }

    if servers.is_empty() {
        warn!("no surface enabled; nothing to serve");
    } else {
        info!("emulator running; waiting for termination signal");
        signal::ctrl_c().await?;
        info!("ctrl-c received; shutting down");
    }

    for server in servers {
        let name = server.name();
        if let Err(err) = server.shutdown().await {
            warn!(server = name, error = %err, "server did not shut down cleanly");
        }
    }
    if let Some(server) = metrics_server {
        server.shutdown().await?;
    }
    Ok(())
}
