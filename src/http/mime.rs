//! MIME type detection module
//!
//! Returns the Content-Type for a served file based on its extension.

use std::path::Path;

/// Content-Type used when the extension is unknown
pub const FALLBACK_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Guess the Content-Type of `path` from its extension
pub fn guess_content_type(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}
