//! Tracing configuration and log routing.
//!
//! The HTTP server logs to stdout with a compact formatter and mirrors events into a file:
//! `DROPNOTES_LOG_FILE` when set, `logs/dropnotes.log` otherwise. The one-shot CLI keeps stdout
//! for the summary itself and logs to stderr only.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "dropnotes.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where a process sends its diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogMode {
    /// Long-running server: stdout plus a non-blocking file layer.
    Server,
    /// Command-line invocation: stderr only, quieter default filter.
    Cli,
}

impl LogMode {
    fn default_filter(self) -> &'static str {
        match self {
            Self::Server => "info",
            Self::Cli => "warn",
        }
    }
}

/// Install the global tracing subscriber for the given mode.
///
/// `RUST_LOG` overrides the default filter in both modes.
pub fn init_tracing(mode: LogMode) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_filter()));

    match mode {
        LogMode::Cli => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
        }
        LogMode::Server => {
            let registry = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).compact());

            match open_log_writer() {
                Some(writer) => registry
                    .with(
                        fmt::layer()
                            .with_writer(writer)
                            .with_target(true)
                            .with_ansi(false)
                            .compact(),
                    )
                    .init(),
                None => registry.init(),
            }
        }
    }
}

/// Returns `None` when the log file cannot be opened; stdout logging still works in that case.
fn open_log_writer() -> Option<NonBlocking> {
    let (writer, guard) = match std::env::var("DROPNOTES_LOG_FILE") {
        Ok(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| eprintln!("Failed to open log file {path}: {err}"))
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        Err(_) => {
            std::fs::create_dir_all(DEFAULT_LOG_DIR)
                .map_err(|err| eprintln!("Failed to create {DEFAULT_LOG_DIR} directory: {err}"))
                .ok()?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                DEFAULT_LOG_DIR,
                DEFAULT_LOG_FILE,
            ))
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
