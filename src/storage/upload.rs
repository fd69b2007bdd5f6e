//! Upload persistence
//!
//! Streams a single multipart file part to the upload directory under the
//! name the client sent. Same name means overwrite.

use multer::Multipart;
use serde::Serialize;
use std::path::{Component, Path};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// What was stored, in the shape upload clients usually expect
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredUpload {
    pub fieldname: String,
    pub originalname: String,
    pub mimetype: String,
    pub destination: String,
    pub filename: String,
    pub path: String,
    pub size: u64,
}

/// Accept the client name only if it is one plain path component
pub fn validate_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single && !name.contains(|c: char| c == '/' || c == '\\') {
        Ok(name)
    } else {
        Err(AppError::client(format!("Invalid upload file name: {name:?}")))
    }
}

/// Read the multipart stream and persist the one file under `field_name`.
///
/// Parts with other names are ignored. A second file under `field_name`
/// or no file at all is a client error.
pub async fn save_single_file(
    mut multipart: Multipart<'_>,
    field_name: &str,
    upload_dir: &Path,
) -> Result<StoredUpload> {
    let mut stored: Option<StoredUpload> = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        if stored.is_some() {
            return Err(AppError::client(format!(
                "Unexpected field: more than one file in '{field_name}'"
            )));
        }

        let original = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| AppError::client(format!("Field '{field_name}' is not a file")))?;
        let file_name = validate_file_name(&original)?;
        let mimetype = field
            .content_type()
            .map_or_else(|| "application/octet-stream".to_string(), ToString::to_string);
        let path = upload_dir.join(file_name);

        let size = match write_field(&mut field, &path).await {
            Ok(size) => size,
            Err(e) => {
                // Drop the partial file, the error is what matters
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e);
            }
        };

        stored = Some(StoredUpload {
            fieldname: field_name.to_string(),
            originalname: original.clone(),
            mimetype,
            destination: upload_dir.display().to_string(),
            filename: original.clone(),
            path: path.display().to_string(),
            size,
        });
    }

    stored.ok_or_else(|| AppError::client("No file uploaded"))
}

async fn write_field(field: &mut multer::Field<'_>, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| AppError::io(path, e))?;

    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::io(path, e))?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| AppError::io(path, e))?;

    Ok(size)
}
