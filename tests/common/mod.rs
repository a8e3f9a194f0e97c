//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock upstream answering every request with a fixed JSON body.
/// Returns its address and a counter of requests received.
pub async fn start_json_upstream(body: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    start_programmable_upstream(move |_req| async move { (200, body.to_string()) }).await
}

/// Start a programmable mock upstream. The closure receives the HTTP
/// request line (e.g. `GET /api/check?query=x HTTP/1.1`) and returns
/// (status, body); the response claims `application/json`.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, Arc<AtomicU32>)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    serve(f, "application/json").await
}

/// Mock upstream answering with a plain-text body.
#[allow(dead_code)]
pub async fn start_text_upstream(body: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    serve(
        move |_req| async move { (200, body.to_string()) },
        "text/plain",
    )
    .await
}

/// Mock upstream that accepts connections but never answers, for timeout
/// testing. The counter still records received requests.
pub async fn start_stalling_upstream() -> (SocketAddr, Arc<AtomicU32>) {
    serve(
        move |_req| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            (200, "{}".to_string())
        },
        "application/json",
    )
    .await
}

async fn serve<F, Fut>(f: F, content_type: &'static str) -> (SocketAddr, Arc<AtomicU32>)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let f = f.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]);
                let request_line = head.lines().next().unwrap_or_default().to_string();
                counter.fetch_add(1, Ordering::SeqCst);

                let (status, body) = f(request_line).await;
                let status_text = match status {
                    200 => "200 OK",
                    400 => "400 Bad Request",
                    401 => "401 Unauthorized",
                    404 => "404 Not Found",
                    429 => "429 Too Many Requests",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, calls)
}
