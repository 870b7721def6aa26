//! ---
//! emu_section: "01-core-functionality"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Shared primitives and utilities for the emulator runtime."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::LogFormat;

/// Upper bound on instances of a single component kind.
pub const MAX_INSTANCES_PER_KIND: usize = 64;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn default_inputs() -> usize {
    4
}

fn default_switches() -> usize {
    4
}

fn default_enabled() -> bool {
    true
}

fn default_api_listen() -> SocketAddr {
    SocketAddr::new(LOCALHOST, 8080)
}

fn default_kvs_listen() -> SocketAddr {
    SocketAddr::new(LOCALHOST, 9090)
}

fn default_metrics_listen() -> SocketAddr {
    SocketAddr::new(LOCALHOST, 9898)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

/// Primary configuration object for the emulator runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub kvs: KvsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no file was found and built-in defaults are in effect.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "RELAY_EMU_CONFIG";
    pub const ENV_KVS_HOST: &'static str = "KVS_HOST";
    pub const ENV_KVS_PORT: &'static str = "KVS_PORT";

    /// Load configuration from disk, respecting the `RELAY_EMU_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration together with the effective source path.
    ///
    /// An explicit `RELAY_EMU_CONFIG` path must exist. Otherwise the first existing
    /// candidate wins, and the built-in defaults apply when none exists.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!(
            inspected = candidates.len(),
            "no configuration file found; using defaults"
        );
        let mut config = AppConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(LoadedAppConfig {
            config,
            source: None,
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let mut config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `KVS_HOST` / `KVS_PORT` to the standalone store listener.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var(Self::ENV_KVS_HOST) {
            let host = host.trim();
            if !host.is_empty() {
                let ip: IpAddr = host
                    .parse()
                    .with_context(|| format!("{} is not an IP address: {host}", Self::ENV_KVS_HOST))?;
                self.kvs.listen.set_ip(ip);
            }
        }
        if let Ok(port) = std::env::var(Self::ENV_KVS_PORT) {
            let port = port.trim();
            if !port.is_empty() {
                let port: u16 = port
                    .parse()
                    .with_context(|| format!("{} is not a port: {port}", Self::ENV_KVS_PORT))?;
                self.kvs.listen.set_port(port);
            }
        }
        Ok(())
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.device.validate()?;
        if self.api.enabled
            && self.kvs.enabled
            && self.api.listen == self.kvs.listen
            && self.api.listen.port() != 0
        {
            return Err(anyhow!(
                "api and kvs listeners cannot share address {}",
                self.api.listen
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Number of instances of each component kind exposed by the emulated device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    #[serde(default = "default_inputs")]
    pub inputs: usize,
    #[serde(default = "default_switches")]
    pub switches: usize,
    #[serde(default)]
    pub scripts: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            inputs: default_inputs(),
            switches: default_switches(),
            scripts: 0,
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        for (kind, count) in [
            ("inputs", self.inputs),
            ("switches", self.switches),
            ("scripts", self.scripts),
        ] {
            if count > MAX_INSTANCES_PER_KIND {
                return Err(anyhow!(
                    "device.{kind} = {count} exceeds the limit of {MAX_INSTANCES_PER_KIND}"
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen: default_api_listen(),
        }
    }
}

/// Standalone versioned store service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_kvs_listen")]
    pub listen: SocketAddr,
}

impl Default for KvsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen: default_kvs_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_metrics_listen(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}
