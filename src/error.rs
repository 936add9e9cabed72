//! Request error types
//!
//! Every variant ends up as a `500` with an empty body; the router logs the detail.

use std::path::{Path, PathBuf};

/// Result type for request handling
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors that abort a single request
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Failed to find public_html directory")]
    RootUnavailable,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read request body: {0}")]
    Body(String),
}

impl ServeError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
