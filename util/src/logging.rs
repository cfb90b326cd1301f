//! Tracing subscriber setup for binaries.

use std::fs;
use std::path::Path;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber: a daily-rolling file layer under `log_dir`,
/// plus an ANSI stdout layer when `log_to_stdout` is set.
///
/// `LOG_LEVEL` in the environment wins over `log_level`. Keep the returned guard
/// alive for the whole process or buffered lines are lost.
pub fn init_logging(
    log_dir: &str,
    log_file: &str,
    log_level: &str,
    log_to_stdout: bool,
) -> WorkerGuard {
    if !Path::new(log_dir).exists() {
        fs::create_dir_all(log_dir).ok();
    }

    let file_appender = rolling::daily(log_dir, log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if log_to_stdout {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true);
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
