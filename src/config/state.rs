// Application state module
// Holds configuration, resolved paths and the route catalog built at startup

use tokio::sync::Mutex;

use super::types::Config;
use super::StoragePaths;
use crate::catalog::{scan, Catalog};
use crate::error::{AppError, Result};

/// Application state, shared read-only across connections
pub struct AppState {
    pub config: Config,
    pub paths: StoragePaths,
    pub catalog: Catalog,
    /// Serializes writes to the fixed export archive path
    pub export_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config, paths: StoragePaths, catalog: Catalog) -> Self {
        Self {
            config,
            paths,
            catalog,
            export_lock: Mutex::new(()),
        }
    }

    /// Resolve storage, create the upload directory and scan the data root once
    pub fn bootstrap(config: Config) -> Result<Self> {
        let paths = config
            .resolve_storage()
            .map_err(|e| AppError::Config(format!("cannot resolve storage paths: {e}")))?;

        std::fs::create_dir_all(&paths.upload_dir)
            .map_err(|e| AppError::io(&paths.upload_dir, e))?;

        let files = scan::enumerate_files(&paths.data_dir)?;
        let catalog = Catalog::build(config.route_prefix(), &paths.data_dir, files);

        Ok(Self::new(config, paths, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::config_with_base;

    #[test]
    fn test_bootstrap_creates_upload_dir_and_scans() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(base.path().join("data/nested")).unwrap();
        std::fs::write(base.path().join("data/a.csv"), "x,y\n1,2\n").unwrap();
        std::fs::write(base.path().join("data/nested/b.xlsx"), b"not really").unwrap();
        std::fs::write(base.path().join("data/notes.txt"), "skip me").unwrap();

        let state = AppState::bootstrap(config_with_base(base.path())).unwrap();

        assert!(base.path().join("test").is_dir());
        assert_eq!(state.catalog.len(), 2);
        assert!(state.catalog.resolve("a.csv").is_some());
        assert!(state.catalog.resolve("nested%2Fb.xlsx").is_some());
    }

    #[test]
    fn test_bootstrap_fails_without_data_dir() {
        let base = tempfile::tempdir().unwrap();
        let result = AppState::bootstrap(config_with_base(base.path()));
        assert!(matches!(result, Err(AppError::Io { .. })));
    }
}
