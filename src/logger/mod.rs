//! Logger module
//!
//! Thin helpers over `tracing` for server lifecycle, catalog building,
//! errors and access logs. `init` installs the subscriber once at startup.

mod format;

pub use format::AccessLogEntry;

use std::fs::{File, OpenOptions};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, StoragePaths};
use crate::error::AppError;

/// Install the global subscriber, writing to `logging.log_file` or stdout
pub fn init(config: &Config) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(&config.logging.level)
        .map_err(|e| AppError::Logging(format!("bad level '{}': {e}", config.logging.level)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.logging.log_file.as_deref() {
        Some(path) => {
            let file = open_log_file(path)
                .map_err(|e| AppError::Logging(format!("cannot open log file '{path}': {e}")))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.try_init(),
    };

    result.map_err(|e| AppError::Logging(e.to_string()))
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> std::io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, paths: &StoragePaths, routes: usize) {
    tracing::info!("======================================");
    tracing::info!("Server is running at http://{addr}");
    tracing::info!("Data directory: {}", paths.data_dir.display());
    tracing::info!("Upload directory: {}", paths.upload_dir.display());
    tracing::info!("Export archive: {}", paths.export_file.display());
    tracing::info!("Data routes: {routes}");
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_route_created(route: &str) {
    tracing::info!("API route created: {route}");
}

pub fn log_skipped_file(path: &Path) {
    tracing::info!("Skipping unsupported file type: {}", path.display());
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log a request failure with the operation and file it concerned
pub fn log_request_failure(operation: &str, path: &Path, err: &AppError) {
    tracing::error!(operation, path = %path.display(), "{err}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown() {
    tracing::info!("Shutdown requested, no longer accepting connections");
}
