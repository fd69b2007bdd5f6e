//! Content decoding
//!
//! Turns one catalog entry into a list of records. Every call reads the file
//! from disk again; nothing is cached, so edits show up on the next request.

mod delimited;
mod spreadsheet;

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::catalog::{FileEntry, FileKind};
use crate::error::DecodeError;

/// One row of tabular data, keyed by header in column order
pub type Record = Map<String, Value>;

pub use delimited::decode_csv;
pub use spreadsheet::decode_workbook;

#[cfg(test)]
pub(crate) use spreadsheet::tests::write_xlsx;

/// Decode synchronously by kind. `Unsupported` yields no records.
pub fn decode_file(path: &Path, kind: FileKind) -> Result<Vec<Record>, DecodeError> {
    match kind {
        FileKind::Spreadsheet => decode_workbook(path),
        FileKind::Delimited => decode_csv(path),
        FileKind::Unsupported => Ok(Vec::new()),
    }
}

/// Decode an entry on the blocking pool and wait for the complete result.
// TODO: cache decoded records keyed by (path, mtime) if decode cost shows up in request latency
pub async fn decode_entry(entry: &FileEntry) -> Result<Vec<Record>, DecodeError> {
    let path: PathBuf = entry.absolute_path.clone();
    let kind = entry.kind;
    tokio::task::spawn_blocking(move || decode_file(&path, kind))
        .await
        .map_err(|e| DecodeError::Aborted(e.to_string()))?
}

/// Header names with empty cells named `__EMPTY` and repeats suffixed `_1`, `_2`, ...
pub(crate) fn unique_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|h| {
            let base = match h.as_ref().trim() {
                "" => "__EMPTY".to_string(),
                _ => h.as_ref().to_string(),
            };
            let mut name = base.clone();
            let mut n = 0;
            while !seen.insert(name.clone()) {
                n += 1;
                name = format!("{base}_{n}");
            }
            name
        })
        .collect()
}
