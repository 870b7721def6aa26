//! ---
//! emu_section: "04-observability"
//! emu_subsection: "module"
//! emu_type: "source"
//! emu_scope: "code"
//! emu_description: "Tracing setup with one rolling log file per served surface."
//! emu_version: "v0.0.0-prealpha"
//! emu_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, Metadata};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "RELAY_EMU_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Stdout rendering of log events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Which log file an event is written to, decided by its target module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSurface {
    /// Component dispatch and the device HTTP server.
    Device,
    /// Versioned store and the standalone store HTTP server.
    Kvs,
    /// Everything else: daemon lifecycle, metrics, HTTP tracing.
    Daemon,
}

impl LogSurface {
    pub const ALL: [LogSurface; 3] = [LogSurface::Device, LogSurface::Kvs, LogSurface::Daemon];

    pub fn of(target: &str) -> Self {
        if target.starts_with("relay_emu_device") || target.starts_with("relay_emu_api::device") {
            LogSurface::Device
        } else if target.starts_with("relay_emu_kvs") || target.starts_with("relay_emu_api::kvs") {
            LogSurface::Kvs
        } else {
            LogSurface::Daemon
        }
    }

    /// File name prefix under the log directory; the appender adds the date.
    pub fn file_name(self, prefix: &str) -> String {
        match self {
            LogSurface::Device => format!("{prefix}-device.log"),
            LogSurface::Kvs => format!("{prefix}-kvs.log"),
            LogSurface::Daemon => format!("{prefix}.log"),
        }
    }
}

/// Flushes buffered log lines when dropped. Hold it for the life of the process.
#[must_use = "dropping the guards stops the log writers"]
#[derive(Debug)]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
    installed: bool,
}

impl LogGuards {
    /// `false` when another global subscriber was already in place.
    pub fn installed(&self) -> bool {
        self.installed
    }
}

/// Install the global subscriber for `service_name`.
///
/// The filter comes from `RELAY_EMU_LOG`, then `RUST_LOG`, then `info`. Stdout
/// gets every event in the configured [`LogFormat`]; each [`LogSurface`] gets
/// its own daily rolling JSON file.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<LogGuards> {
    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!("failed to create log directory {}", config.directory.display())
    })?;
    let prefix = config.file_prefix.as_deref().unwrap_or(service_name);

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];
    let mut layers = vec![stdout_layer(config.format, stdout_writer)];

    for surface in LogSurface::ALL {
        let appender = rolling::daily(&config.directory, surface.file_name(prefix));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        layers.push(
            fmt::layer()
                .with_timer(UtcTime::rfc_3339())
                .json()
                .with_writer(writer)
                .with_filter(filter_fn(move |meta: &Metadata<'_>| {
                    LogSurface::of(meta.target()) == surface
                }))
                .boxed(),
        );
    }

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter())
        .try_init()
        .is_ok();

    info!(
        service = service_name,
        log_dir = %config.directory.display(),
        format = ?config.format,
        installed,
        "tracing initialised"
    );
    Ok(LogGuards {
        _guards: guards,
        installed,
    })
}

fn stdout_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(UtcTime::rfc_3339())
            .json()
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed(),
    }
}

fn env_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(&directive).unwrap_or_else(|err| {
            eprintln!("invalid {LOG_ENV} directive '{directive}' ({err}); using {DEFAULT_DIRECTIVE}");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        }),
        Err(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}
