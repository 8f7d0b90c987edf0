//! Logging
//!
//! Compact stdout logs filtered by `RUST_LOG`, plus an optional per-run file
//! written through a non-blocking appender. The returned [`LogGuard`] must be
//! held until the run ends; dropping it flushes the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_DIR_KEY: &str = "DCA_LOG_DIR";

const FILE_FILTER: &str = "info,dca_core=debug,dca_exchange=debug,dca_bot=debug";

/// Keeps buffered file output alive until the run is over.
pub struct LogGuard {
    started: Instant,
    file: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

impl LogGuard {
    /// Path of this run's log file, if file logging is on
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// End the run's log. Equivalent to dropping the guard.
    pub fn finalize(self) {}
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(elapsed_ms, log_file = ?self.file, "Finalizing run log");
        // _worker is dropped after this body and flushes the file
    }
}

/// File name for one run, e.g. `gmocoin.2024-01-01T09-00-00.123Z.log`
pub fn log_file_name(app_name: &str) -> String {
    format!("{app_name}.{}.log", Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}

/// Install the global subscriber.
pub fn init(app_name: &str, log_dir: Option<&Path>) -> anyhow::Result<LogGuard> {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact()
        .with_filter(stdout_filter);

    let (file_layer, worker, file) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let file_name = log_file_name(app_name);
            let appender = tracing_appender::rolling::never(dir, &file_name);
            let (writer, worker) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(worker), Some(dir.join(file_name)))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::debug!(app = app_name, log_file = ?file, "Logging initialized");

    Ok(LogGuard {
        started: Instant::now(),
        file,
        _worker: worker,
    })
}
