//! Export endpoint

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::Path;

use crate::config::AppState;
use crate::http::{self, mime};
use crate::logger;
use crate::storage;

/// Rebuild the export archive from the current data directory and send it
pub async fn handle_export(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    let _guard = state.export_lock.lock().await;
    let archive_path = &state.paths.export_file;

    match storage::export_archive(&state.paths.data_dir, archive_path).await {
        Ok((summary, bytes)) => {
            tracing::info!(
                files = summary.file_count,
                bytes = bytes.len(),
                archive = %archive_path.display(),
                "Data exported"
            );
            http::build_attachment_response(
                bytes,
                mime::get_content_type(archive_path.extension().and_then(|e| e.to_str())),
                &download_name(archive_path),
                is_head,
            )
        }
        Err(err) => {
            logger::log_request_failure("export", &state.paths.data_dir, &err);
            http::build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "Error exporting data")
        }
    }
}

fn download_name(archive_path: &Path) -> String {
    archive_path
        .file_name()
        .map_or_else(|| "export.zip".to_string(), |n| n.to_string_lossy().into_owned())
}
