//! Data directory export
//!
//! Writes every file currently under the data root into a deflate zip at a
//! fixed path. Entry names are the `/`-separated relative paths, handed to the
//! zip writer as data.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::catalog::{route, scan};
use crate::error::{AppError, Result};
use crate::logger;

/// Outcome of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub archive_path: PathBuf,
    pub file_count: usize,
}

/// Re-scan `data_dir` and (re)write the archive at `archive_path`.
///
/// The zip is built next to the target and renamed over it when complete.
/// The archive itself is never included, even when it lives in `data_dir`.
pub fn write_archive(data_dir: &Path, archive_path: &Path) -> Result<ExportSummary> {
    let files = scan::enumerate_files(data_dir)?;
    let partial = partial_path(archive_path);

    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }
    }

    let out = File::create(&partial).map_err(|e| AppError::io(&partial, e))?;
    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let mut file_count = 0;
    for path in &files {
        if path == archive_path || *path == partial {
            continue;
        }
        let Some(name) = route::relative_key(data_dir, path) else {
            logger::log_warning(&format!(
                "Export skipping file with non UTF-8 path: {}",
                path.display()
            ));
            continue;
        };

        let mut source = File::open(path).map_err(|e| AppError::io(path, e))?;
        zip.start_file(name, options)?;
        std::io::copy(&mut source, &mut zip).map_err(|e| AppError::io(path, e))?;
        file_count += 1;
    }

    zip.finish()?;
    std::fs::rename(&partial, archive_path).map_err(|e| AppError::io(archive_path, e))?;

    Ok(ExportSummary {
        archive_path: archive_path.to_path_buf(),
        file_count,
    })
}

/// Build the archive on the blocking pool and return its bytes
pub async fn export_archive(data_dir: &Path, archive_path: &Path) -> Result<(ExportSummary, Vec<u8>)> {
    let data_dir = data_dir.to_path_buf();
    let target = archive_path.to_path_buf();

    let summary = tokio::task::spawn_blocking(move || write_archive(&data_dir, &target))
        .await
        .map_err(|e| AppError::Archive(format!("export task failed: {e}")))??;

    let bytes = tokio::fs::read(&summary.archive_path)
        .await
        .map_err(|e| AppError::io(&summary.archive_path, e))?;

    Ok((summary, bytes))
}

fn partial_path(archive_path: &Path) -> PathBuf {
    let mut name = OsString::from(archive_path.as_os_str());
    name.push(".partial");
    PathBuf::from(name)
}
