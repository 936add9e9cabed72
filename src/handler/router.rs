//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch against the
//! route table, error mapping and access logging.

use crate::config::{AppState, StorageConfig};
use crate::handler::{files, upload};
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::{Body, Buf};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// The upload route, present only when a write secret is configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRoute {
    pub secret: String,
}

/// Routes registered at startup
///
/// GET and HEAD always list or serve. PUT is routed to the upload handler
/// only when the table was built with a write secret; otherwise it is an
/// unmatched method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub upload: Option<UploadRoute>,
}

impl RouteTable {
    pub fn from_storage(storage: &StorageConfig) -> Self {
        Self {
            upload: storage.write_secret().map(|secret| UploadRoute {
                secret: secret.to_string(),
            }),
        }
    }

    /// Value of the `Allow` header for this table
    pub const fn allowed_methods(&self) -> &'static str {
        if self.upload.is_some() {
            "GET, HEAD, PUT"
        } else {
            "GET, HEAD"
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body,
    B::Data: Buf,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state
        .access_log()
        .then(|| access_entry(&req, peer_addr));

    let mut response = dispatch(req, &state).await;
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = if entry.method == "HEAD" {
            0
        } else {
            http::content_length(&response)
        };
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request and turn handler errors into `500`
pub async fn dispatch<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: Body,
    B::Data: Buf,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let result = match (&method, &state.routes.upload) {
        (&Method::GET, _) => files::list_or_serve(req.uri().path(), false, state).await,
        (&Method::HEAD, _) => files::list_or_serve(req.uri().path(), true, state).await,
        (&Method::PUT, Some(route)) => upload::handle_upload(req, route, state).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return http::build_405_response(state.routes.allowed_methods());
        }
    };

    result.unwrap_or_else(|e| {
        logger::log_error(&e.to_string());
        http::build_empty_response(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let uri = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), req.method().to_string(), uri);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::root::PUBLIC_HTML;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Temporary `$HOME` with an empty `public_html`
    pub struct Fixture {
        _home: TempDir,
        pub root: PathBuf,
        pub state: AppState,
    }

    impl Fixture {
        pub fn new(secret: Option<&str>) -> Self {
            let home = tempfile::tempdir().unwrap();
            let root = home.path().join(PUBLIC_HTML);
            std::fs::create_dir(&root).unwrap();
            let state = state_with(Some(home.path().display().to_string()), secret);
            Self {
                _home: home,
                root,
                state,
            }
        }
    }

    pub fn state_with(home: Option<String>, secret: Option<&str>) -> AppState {
        let mut config = Config::load_with_env("no-such-config-file", |_| None).unwrap();
        config.logging.access_log = false;
        config.storage = StorageConfig {
            tool_data_dir: None,
            home_dir: home,
            write_secret: secret.map(ToString::to_string),
        };
        AppState::new(&config)
    }

    pub fn request(method: Method, path: &str, body: &'static [u8]) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from_static(body)))
            .unwrap()
    }

    pub async fn body_bytes(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_route_table_without_secret() {
        let table = RouteTable::from_storage(&StorageConfig::default());
        assert_eq!(table.upload, None);
        assert_eq!(table.allowed_methods(), "GET, HEAD");
    }

    #[test]
    fn test_route_table_with_secret() {
        let table = RouteTable::from_storage(&StorageConfig {
            write_secret: Some("k".to_string()),
            ..StorageConfig::default()
        });
        assert_eq!(
            table.upload,
            Some(UploadRoute {
                secret: "k".to_string()
            })
        );
        assert_eq!(table.allowed_methods(), "GET, HEAD, PUT");
    }

    #[tokio::test]
    async fn test_put_without_upload_route_is_405() {
        let fx = Fixture::new(None);
        let resp = dispatch(request(Method::PUT, "/new.txt", b"data"), &fx.state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD");
        assert!(!fx.root.join("new.txt").exists());
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let fx = Fixture::new(Some("k"));
        let resp = dispatch(request(Method::DELETE, "/x", b""), &fx.state).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, PUT");
    }

    #[tokio::test]
    async fn test_unresolved_root_is_500() {
        let state = state_with(None, Some("k"));
        let resp = dispatch(request(Method::GET, "/", b""), &state).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_bytes(resp).await.is_empty());

        let resp = dispatch(request(Method::PUT, "/a.txt", b"x"), &state).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_handle_request_passes_response_through() {
        let fx = Fixture::new(None);
        std::fs::write(fx.root.join("a.txt"), b"abc").unwrap();
        let state = Arc::new(fx.state);

        let resp = handle_request(
            request(Method::GET, "/a.txt", b""),
            Arc::clone(&state),
            "127.0.0.1:9999".parse().unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["server"], "public-html-server");
        assert_eq!(body_bytes(resp).await, Bytes::from_static(b"abc"));
    }
}
