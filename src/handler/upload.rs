//! Upload handler
//!
//! `PUT /{path}` with `Authorization: <scheme> <secret>` creates the file at
//! `path` from the request body. An existing file is never replaced; the
//! request then succeeds with `200` without reading the body.

use crate::auth::has_valid_token;
use crate::config::AppState;
use crate::error::{Result, ServeError};
use crate::handler::router::UploadRoute;
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::storage::upload::{already_uploaded, ensure_parent};
use crate::storage::{resolve_root, resolve_target, write_new_file, UploadOutcome};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Buf, Bytes};
use hyper::header::{AUTHORIZATION, CONTENT_LENGTH};
use hyper::{Request, StatusCode};
use std::pin::pin;
use std::time::Duration;

/// Handle an authenticated upload
pub async fn handle_upload<B>(
    req: Request<B>,
    route: &UploadRoute,
    state: &AppState,
) -> Result<HttpResponse>
where
    B: Body,
    B::Data: Buf,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let root = resolve_root(state.storage())
        .await
        .ok_or(ServeError::RootUnavailable)?;

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if !has_valid_token(authorization, &route.secret) {
        logger::log_warning(&format!("Upload rejected, bad token: {}", req.uri().path()));
        return Ok(http::build_empty_response(StatusCode::FORBIDDEN));
    }

    let Some(target) = resolve_target(&root, req.uri().path()) else {
        logger::log_warning(&format!("Rejected path outside root: {}", req.uri().path()));
        return Ok(http::build_empty_response(StatusCode::NOT_FOUND));
    };

    ensure_parent(&target).await?;

    if already_uploaded(&target).await {
        logger::log_upload(&target, "exists, left unchanged");
        return Ok(http::build_empty_response(StatusCode::OK));
    }

    let limit = upload_limit(state.config.http.max_upload_size);
    if declared_length(&req).is_some_and(|len| len > u64::try_from(limit).unwrap_or(u64::MAX)) {
        logger::log_warning(&format!(
            "Upload too large: {} (max: {limit} bytes)",
            target.display()
        ));
        return Ok(http::build_413_response());
    }

    let idle = body_idle_timeout(state.config.performance.read_timeout);
    let data = match read_body(req.into_body(), limit, idle).await? {
        BodyRead::Complete(data) => data,
        BodyRead::TooLarge => {
            logger::log_warning(&format!(
                "Upload body exceeded {limit} bytes: {}",
                target.display()
            ));
            return Ok(http::build_413_response());
        }
        BodyRead::Stalled => {
            logger::log_warning(&format!("Upload body stalled: {}", target.display()));
            return Ok(http::build_empty_response(StatusCode::REQUEST_TIMEOUT));
        }
    };

    match write_new_file(&target, &data).await? {
        UploadOutcome::Unchanged => {
            logger::log_upload(&target, "created concurrently, left unchanged");
            Ok(http::build_empty_response(StatusCode::OK))
        }
        UploadOutcome::Created => {
            logger::log_upload(&target, &format!("created ({} bytes)", data.len()));
            Ok(http::build_empty_response(StatusCode::CREATED))
        }
    }
}

/// Configured maximum as a byte count, `0` meaning no limit
fn upload_limit(max_upload_size: u64) -> usize {
    if max_upload_size == 0 {
        usize::MAX
    } else {
        usize::try_from(max_upload_size).unwrap_or(usize::MAX)
    }
}

fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    req.headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// How reading an upload body ended
#[derive(Debug)]
enum BodyRead {
    Complete(Bytes),
    /// The body grew past the upload limit
    TooLarge,
    /// No data arrived for a whole idle period
    Stalled,
}

/// Idle period allowed between body frames, `0` meaning wait forever
fn body_idle_timeout(read_timeout: u64) -> Option<Duration> {
    (read_timeout > 0).then(|| Duration::from_secs(read_timeout))
}

/// Collect the whole body frame by frame
///
/// `idle` bounds the wait for each frame rather than the whole transfer, so
/// a slow upload succeeds as long as it keeps making progress.
async fn read_body<B>(body: B, limit: usize, idle: Option<Duration>) -> Result<BodyRead>
where
    B: Body,
    B::Data: Buf,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut body = pin!(Limited::new(body, limit));
    let mut data = Vec::new();

    loop {
        let next = match idle {
            Some(idle) => match tokio::time::timeout(idle, body.frame()).await {
                Ok(next) => next,
                Err(_) => return Ok(BodyRead::Stalled),
            },
            None => body.frame().await,
        };

        match next {
            None => return Ok(BodyRead::Complete(Bytes::from(data))),
            Some(Ok(frame)) => {
                if let Ok(mut chunk) = frame.into_data() {
                    let chunk = chunk.copy_to_bytes(chunk.remaining());
                    data.extend_from_slice(&chunk);
                }
            }
            Some(Err(e)) if e.is::<LengthLimitError>() => return Ok(BodyRead::TooLarge),
            Some(Err(e)) => return Err(ServeError::Body(e.to_string())),
        }
    }
}
