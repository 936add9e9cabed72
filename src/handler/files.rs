//! List/serve handler
//!
//! Directories are rendered as listings, regular files are returned with a
//! guessed content type, anything else is a 404.

use crate::config::AppState;
use crate::error::{Result, ServeError};
use crate::http::{self, mime, HttpResponse};
use crate::listing::render_listing;
use crate::logger;
use crate::storage::{resolve_root, resolve_target};
use chrono::{DateTime, Utc};
use hyper::StatusCode;
use tokio::fs::{self, File};

/// Handle `GET`/`HEAD` for `path`
pub async fn list_or_serve(path: &str, is_head: bool, state: &AppState) -> Result<HttpResponse> {
    let root = resolve_root(state.storage())
        .await
        .ok_or(ServeError::RootUnavailable)?;

    let Some(target) = resolve_target(&root, path) else {
        logger::log_warning(&format!("Rejected path outside root: {path}"));
        return Ok(http::build_empty_response(StatusCode::NOT_FOUND));
    };

    // Stat failures count as "not there"
    let Ok(metadata) = fs::metadata(&target).await else {
        return Ok(http::build_empty_response(StatusCode::NOT_FOUND));
    };

    if metadata.is_dir() {
        let html = render_listing(&root, &target).await?;
        return Ok(http::build_html_response(html, is_head));
    }

    if metadata.is_file() {
        // HEAD answers from metadata alone
        let file = if is_head {
            None
        } else {
            let file = File::open(&target)
                .await
                .map_err(|e| ServeError::io(&target, e))?;
            Some(file)
        };
        let last_modified = metadata.modified().ok().map(DateTime::<Utc>::from);
        return Ok(http::build_file_response(
            file,
            metadata.len(),
            mime::guess_content_type(&target),
            last_modified,
        ));
    }

    Ok(http::build_empty_response(StatusCode::NOT_FOUND))
}
