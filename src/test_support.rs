//! Minimal HTTP stub used by source and notifier tests

use std::sync::{Arc, Mutex};
use std::thread;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// A local HTTP server that answers every request with the same canned response
///
/// Runs on its own thread and runtime, independent of the test's runtime.
pub(crate) struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Start serving `status` (e.g. "200 OK") with `body` on an ephemeral port
    pub(crate) fn start(status: &str, body: &str) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = TcpListener::from_std(listener).unwrap();
                while let Ok((socket, _)) = listener.accept().await {
                    Self::answer(socket, &response, &seen).await;
                }
            });
        });

        Self { url, requests }
    }

    /// Request lines received so far, e.g. "GET /api HTTP/1.1"
    pub(crate) fn request_lines(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    async fn answer(socket: TcpStream, response: &str, seen: &Mutex<Vec<String>>) {
        let (read_half, mut write_half) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();

        if let Ok(Some(request_line)) = lines.next_line().await {
            seen.lock().unwrap().push(request_line);
        }
        // headers end at the first blank line
        while let Ok(Some(line)) = lines.next_line().await {
            if line.is_empty() {
                break;
            }
        }

        let _ = write_half.write_all(response.as_bytes()).await;
        let _ = write_half.shutdown().await;
    }
}

/// A URL on which nothing is listening
pub(crate) fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
