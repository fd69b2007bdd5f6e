//! Request handler module
//!
//! Request routing dispatch plus the data, upload and export endpoints.

mod data;
mod export;
pub mod router;
mod upload;

// Re-export main entry point
pub use router::handle_request;
