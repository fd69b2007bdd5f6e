//! Error types
//!
//! `AppError` covers everything a request or startup step can fail with;
//! `DecodeError` is the content-decoder subset.

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error
#[derive(Error, Debug)]
pub enum AppError {
    /// Enumeration, read or write failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content could not be decoded into records
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request itself was unusable (missing upload, bad multipart)
    #[error("Bad request: {0}")]
    ClientInput(String),

    /// Request body exceeded `http.max_body_size`
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Archive creation failed
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Content decoder failures
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Background decode task died before producing a result
    #[error("decode task failed: {0}")]
    Aborted(String),
}

impl AppError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        Self::ClientInput(message.into())
    }

    /// HTTP status this error maps to at the handler boundary
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Io { .. }
            | Self::Decode(_)
            | Self::Archive(_)
            | Self::Config(_)
            | Self::Logging(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<multer::Error> for AppError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
                Self::PayloadTooLarge
            }
            other => Self::ClientInput(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}
