// src/logging.rs
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{OsintError, OsintResult};

/// Environment variable consulted when `RUST_LOG` is unset
pub const LOG_ENV: &str = "PROBEHOUND_LOGLEVEL";

/// Filter directive from `RUST_LOG`, then [`LOG_ENV`], then the crate default
pub fn filter_directive(verbose: bool) -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| default_directive(verbose))
}

fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// Install the global subscriber: compact stderr output plus an optional
/// append-only log file without ANSI colours.
pub fn init(verbose: bool, log_file: Option<&Path>) -> OsintResult<()> {
    let directive = filter_directive(verbose);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(EnvFilter::new(&directive));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| OsintError::Persistence {
                    path: parent.to_path_buf(),
                    message: format!("Failed to create log directory: {}", e),
                })?;
            }

            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| OsintError::Persistence {
                    path: path.to_path_buf(),
                    message: format!("Failed to open log file: {}", e),
                })?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(&directive)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| OsintError::Configuration(format!("Failed to initialize logging: {}", e)))
}
