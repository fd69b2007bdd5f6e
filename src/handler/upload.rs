//! Upload endpoint

use futures_util::TryStreamExt;
use http_body_util::{BodyStream, Full};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use multer::{Constraints, Multipart, SizeLimit};
use serde::Serialize;

use crate::config::AppState;
use crate::error::{AppError, Result};
use crate::http;
use crate::logger;
use crate::storage::{self, StoredUpload};

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: &'static str,
    file: StoredUpload,
}

/// Store the single file from a multipart request
pub async fn handle_upload<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    match receive(req, state).await {
        Ok(file) => {
            tracing::info!(file = %file.path, size = file.size, "File uploaded");
            let body = UploadResponse {
                message: "File uploaded successfully",
                file,
            };
            http::build_json_response(StatusCode::OK, &body, false)
        }
        Err(err) => {
            logger::log_request_failure("upload", &state.paths.upload_dir, &err);
            http::build_text_response(err.status(), &public_message(&err))
        }
    }
}

async fn receive<B>(req: Request<B>, state: &AppState) -> Result<StoredUpload>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    let boundary = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| AppError::client("Expected a multipart/form-data request"))?;

    let stream = BodyStream::new(req.into_body())
        .try_filter_map(|frame| async move { Ok(frame.into_data().ok()) });
    let constraints = Constraints::new()
        .size_limit(SizeLimit::new().whole_stream(state.config.http.max_body_size));
    let multipart = Multipart::with_constraints(stream, boundary, constraints);

    storage::save_single_file(
        multipart,
        &state.config.storage.upload_field,
        &state.paths.upload_dir,
    )
    .await
}

/// Client errors explain themselves; server errors stay generic
fn public_message(err: &AppError) -> String {
    match err {
        AppError::ClientInput(message) => message.clone(),
        AppError::PayloadTooLarge => "413 Payload Too Large".to_string(),
        _ => "Error uploading file".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_message_hides_server_errors() {
        assert_eq!(public_message(&AppError::client("No file uploaded")), "No file uploaded");
        let io = AppError::io("/secret/dir", std::io::Error::other("disk full"));
        assert_eq!(public_message(&io), "Error uploading file");
    }
}
