//! File enumeration
//!
//! Recursive, read-only listing of regular files under a root directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{AppError, Result};

/// List every regular file under `root`, recursing into subdirectories.
///
/// Entries are sorted by file name within each directory, so the order is
/// stable for a given tree. Symlinks are not followed.
pub fn enumerate_files(root: &Path) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(root).map_err(|e| AppError::io(root, e))?;
    if !meta.is_dir() {
        return Err(AppError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            AppError::io(path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
