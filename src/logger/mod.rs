//! Logger module
//!
//! Provides logging helpers for the control server including:
//! - Server lifecycle logging
//! - Control API request logging
//! - Error and warning logging
//!
//! Events go through `tracing`; `init` installs the subscriber.

use std::fs::{File, OpenOptions};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{Config, LoggingConfig};

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` takes
/// precedence over `logging.level`.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let writer = match config.log_file.as_deref() {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(io::stderr),
    };

    let layer = if config.json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_ansi(config.log_file.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        level = %config.logging.level,
        workers = ?config.server.workers,
        interval = config.stats.interval,
        "Stats control server started"
    );
    tracing::info!("  - GET  http://{addr}/control/stats");
    tracing::info!("  - GET  http://{addr}/control/stats_info");
    tracing::info!("  - POST http://{addr}/control/stats_config");
    tracing::info!("  - POST http://{addr}/control/stats_reset");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    tracing::trace!(method, path, status, "control request");
}

pub fn log_elapsed(what: &str, elapsed: Duration) {
    tracing::debug!(elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX), "{what}");
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!(active_connections, "Shutting down, no longer accepting connections");
}
