//! Data endpoints
//!
//! One parameterized handler serves every file in the catalog. The file is
//! decoded fresh on each request.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::catalog::FileKind;
use crate::config::AppState;
use crate::decode;
use crate::error::AppError;
use crate::http;
use crate::logger;

/// List every bound file with its route
pub fn list_catalog(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    http::build_json_response(StatusCode::OK, &state.catalog.items(), is_head)
}

/// Decode the file bound to `suffix` and return its records as JSON
pub async fn serve_data(state: &AppState, suffix: &str, is_head: bool) -> Response<Full<Bytes>> {
    let Some(binding) = state.catalog.resolve(suffix) else {
        return http::build_404_response();
    };

    match decode::decode_entry(&binding.entry).await {
        Ok(records) => http::build_json_response(StatusCode::OK, &records, is_head),
        Err(e) => {
            let err = AppError::from(e);
            logger::log_request_failure("decode", &binding.entry.absolute_path, &err);
            http::build_text_response(err.status(), failure_message(binding.entry.kind))
        }
    }
}

/// Client-facing message for a failed decode; the cause stays in the log
const fn failure_message(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Spreadsheet => "Error processing Excel file",
        FileKind::Delimited => "Error processing CSV file",
        FileKind::Unsupported => "Error processing file",
    }
}
