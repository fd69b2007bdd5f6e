//! HTTP protocol layer module
//!
//! Response builders and content types, kept apart from the data handlers.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_413_response, build_attachment_response,
    build_html_response, build_json_response, build_options_response, build_text_response,
    with_cors,
};
