//! HTTP response building module
//!
//! Builders for the handful of responses the server produces. Bodies are
//! boxed so a served file can be streamed from disk while listings and
//! empty responses stay in memory.

use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::{Response, StatusCode};
use std::io;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Body type produced by every handler
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Response type produced by every handler
pub type HttpResponse = Response<ResponseBody>;

fn full(data: Bytes) -> ResponseBody {
    Full::new(data).map_err(|never| match never {}).boxed_unsync()
}

fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Build a response with the given status and no body
pub fn build_empty_response(status: StatusCode) -> HttpResponse {
    Response::builder()
        .status(status)
        .header("Content-Length", 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(empty())
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Allow", allow)
        .header("Content-Length", 0)
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(empty())
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    build_empty_response(StatusCode::PAYLOAD_TOO_LARGE)
}

/// Build HTML response
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        empty()
    } else {
        full(Bytes::from(content))
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Build response streaming an opened file
///
/// `file` is `None` for `HEAD`, in which case only the headers are sent and
/// `content_length` comes from the file's metadata.
pub fn build_file_response(
    file: Option<File>,
    content_length: u64,
    content_type: &str,
    last_modified: Option<DateTime<Utc>>,
) -> HttpResponse {
    let body = match file {
        Some(file) => StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed_unsync(),
        None => empty(),
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length);
    if let Some(modified) = last_modified {
        builder = builder.header(
            "Last-Modified",
            modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        );
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(empty())
    })
}

/// Value of the Content-Length header, zero when absent
pub fn content_length(response: &HttpResponse) -> u64 {
    response
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_response() {
        let resp = build_empty_response(StatusCode::NOT_FOUND);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["content-length"], "0");
        assert_eq!(content_length(&resp), 0);
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let resp = build_405_response("GET, HEAD");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_file_response_streams_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();
        let file = File::open(&path).await.unwrap();

        let modified = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let resp = build_file_response(Some(file), 5, "text/plain", Some(modified));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/plain");
        assert_eq!(resp.headers()["content-length"], "5");
        assert_eq!(
            resp.headers()["last-modified"],
            "Tue, 02 Jan 2024 03:04:05 GMT"
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_head_file_response_has_length_only() {
        let resp = build_file_response(None, 1 << 40, "video/mp4", None);
        assert_eq!(content_length(&resp), 1 << 40);
        assert!(!resp.headers().contains_key("last-modified"));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_head_keeps_length_drops_body() {
        let resp = build_html_response("<p>hi</p>".to_string(), true);
        assert_eq!(resp.headers()["content-length"], "9");
    }
}
