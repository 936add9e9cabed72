//! HTTP protocol layer module
//!
//! Content-type guessing and response builders, independent of the
//! filesystem logic.

pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_405_response, build_413_response, build_empty_response, build_file_response,
    build_html_response, content_length, HttpResponse,
};
