//! On-disk side effects: persisted uploads and the export archive

pub mod archive;
pub mod upload;

pub use archive::{export_archive, ExportSummary};
pub use upload::{save_single_file, StoredUpload};
