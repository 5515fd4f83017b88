use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable holding the log filter (`EnvFilter` syntax)
pub const LOG_ENV: &str = "POMO_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

/// One-shot commands log to stderr.
pub fn init_cli_logging() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

/// The TUI owns the terminal, so it logs to a daily file under
/// `<data-dir>/logs/` through a non-blocking writer. Falls back to no logging
/// if the directory cannot be created.
pub fn init_tui_logging(data_dir: &Path) -> LoggingGuard {
    let dir = log_dir(data_dir);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: could not create log directory {}: {}", dir.display(), e);
        return LoggingGuard { _guard: None };
    }

    let appender = RollingFileAppender::new(Rotation::DAILY, &dir, "pomo.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    tracing::info!(dir = %dir.display(), "logging initialized");
    LoggingGuard {
        _guard: Some(guard),
    }
}
