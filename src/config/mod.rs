// Configuration module entry point
// Loads layered configuration and resolves storage paths

mod state;
mod types;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StorageConfig};

/// Default config file (extension is resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Absolute storage locations derived from `StorageConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub export_file: PathBuf,
}

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Missing file is fine; environment and defaults still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("DATA_API").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("storage.data_dir", "data")?
            .set_default("storage.upload_dir", "test")?
            .set_default("storage.export_file", "exported_data.zip")?
            .set_default("storage.route_prefix", "/api/data/")?
            .set_default("storage.upload_field", "file")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Resolve data, upload and export paths against the base directory
    pub fn resolve_storage(&self) -> std::io::Result<StoragePaths> {
        let base = match &self.storage.base_dir {
            Some(dir) => PathBuf::from(dir),
            None => executable_dir()?,
        };

        Ok(StoragePaths {
            data_dir: base.join(&self.storage.data_dir),
            upload_dir: base.join(&self.storage.upload_dir),
            export_file: base.join(&self.storage.export_file),
        })
    }

    /// Route namespace with exactly one leading and one trailing slash
    pub fn route_prefix(&self) -> String {
        let trimmed = self.storage.route_prefix.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        }
    }
}

fn executable_dir() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}
