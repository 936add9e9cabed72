// Connection handling module
// Serves a single TCP connection on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config;
use crate::handler;
use crate::logger;

/// Accept a connection unless the configured connection limit is reached.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. \
                 Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.access_log() {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve the connection on a spawned task.
///
/// HTTP/1.1 with keep-alive when configured. `read_timeout` bounds how long
/// the request headers may take to arrive; an active transfer is never cut
/// off while bytes keep flowing. The counter is decremented when the task
/// ends.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);
        if performance.read_timeout > 0 {
            builder
                .timer(TokioTimer::new())
                .header_read_timeout(Duration::from_secs(performance.read_timeout));
        }

        let service_state = Arc::clone(&state);
        let service = service_fn(move |req| {
            handler::handle_request(req, Arc::clone(&service_state), peer_addr)
        });

        if let Err(err) = builder.serve_connection(io, service).await {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::router::tests::Fixture;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Accept one connection on an ephemeral port and serve it with `state`
    async fn serve_once(
        state: &Arc<config::AppState>,
        counter: &Arc<AtomicUsize>,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::clone(state);
        let counter = Arc::clone(counter);
        let server = tokio::spawn(async move {
            let (stream, peer) = listener.accept().await.unwrap();
            accept_connection(stream, peer, &state, &counter);
        });
        (addr, server)
    }

    #[tokio::test]
    async fn test_slow_upload_outlives_read_timeout() {
        let mut fx = Fixture::new(Some("k"));
        fx.state.config.performance.read_timeout = 1;
        fx.state.config.performance.write_timeout = 1;
        let root = fx.root.clone();
        let state = Arc::new(fx.state);
        let counter = Arc::new(AtomicUsize::new(0));
        let (addr, server) = serve_once(&state, &counter).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(
                b"PUT /slow.txt HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer k\r\n\
                  Content-Length: 8\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        // 1.6s in total, one byte every 200ms
        for byte in b"slowbody" {
            tokio::time::sleep(Duration::from_millis(200)).await;
            client.write_all(&[*byte]).await.unwrap();
        }

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 201"), "{response}");
        assert_eq!(std::fs::read(root.join("slow.txt")).unwrap(), b"slowbody");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_incomplete_headers_are_dropped() {
        let mut fx = Fixture::new(None);
        fx.state.config.performance.read_timeout = 1;
        let state = Arc::new(fx.state);
        let counter = Arc::new(AtomicUsize::new(0));
        let (addr, server) = serve_once(&state, &counter).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"GET / HTTP/1.1\r\nHost: loc").await.unwrap();

        let mut response = Vec::new();
        let closed = tokio::time::timeout(
            Duration::from_secs(10),
            client.read_to_end(&mut response),
        )
        .await;
        assert!(closed.is_ok(), "connection was not closed");
        server.await.unwrap();

        for _ in 0..100 {
            if counter.load(Ordering::SeqCst) == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
