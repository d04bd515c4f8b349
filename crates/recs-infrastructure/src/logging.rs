use recs_core::{RecsError, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix of the daily rolling log.
pub const LOG_FILE_PREFIX: &str = "recs.log";

/// Where formatted log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Daily rolling files in this directory.
    Directory(PathBuf),
    Stderr,
}

/// Keeps the background log writer alive; drop it last.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Uses `RUST_LOG` if set, otherwise `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| RecsError::config(format!("Invalid log level '{}': {}", level, e))),
    }
}

/// Initializes the global subscriber. Must be called exactly once at startup.
///
/// `extra` sits below the filter and sees every event that passes it; the
/// console installs its diagnostics layer there.
pub fn init_logging<L>(level: &str, target: LogTarget, extra: L) -> Result<LogGuard>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let env_filter = build_filter(level)?;
    let registry = tracing_subscriber::registry().with(extra).with(env_filter);

    let worker = match target {
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
                .try_init()
                .map_err(|e| RecsError::internal(format!("Logging already initialized: {}", e)))?;
            Some(guard)
        }
        LogTarget::Stderr => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .try_init()
                .map_err(|e| RecsError::internal(format!("Logging already initialized: {}", e)))?;
            None
        }
    };

    Ok(LogGuard { _worker: worker })
}
