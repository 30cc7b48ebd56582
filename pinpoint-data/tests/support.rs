//! Loopback HTTP server with canned replies for geocoder tests.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How the server answers each request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with `status` and a JSON `body`.
    Respond {
        /// HTTP status code to send.
        status: u16,
        /// JSON body to send.
        body: String,
    },
    /// Read the request and never answer.
    Stall,
}

/// A server bound to an ephemeral loopback port.
///
/// Must be started inside a Tokio runtime; connections are served while that
/// runtime is driven.
pub struct CannedServer {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl CannedServer {
    /// Bind a loopback listener and serve `reply` to every request.
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|err| panic!("failed to bind loopback listener: {err}"));
        let address = listener
            .local_addr()
            .unwrap_or_else(|err| panic!("listener has no address: {err}"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, reply.clone(), Arc::clone(&log)));
            }
        });
        Self {
            endpoint: format!("http://{address}/search"),
            requests,
            task,
        }
    }

    /// Search endpoint URL pointing at this server.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request heads received so far, lowercased.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for CannedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An endpoint on a loopback port with no listener behind it.
pub async fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|err| panic!("failed to bind loopback listener: {err}"));
    let address = listener
        .local_addr()
        .unwrap_or_else(|err| panic!("listener has no address: {err}"));
    drop(listener);
    format!("http://{address}/search")
}

async fn serve(mut stream: TcpStream, reply: Reply, log: Arc<Mutex<Vec<String>>>) {
    let head = read_head(&mut stream).await;
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(head.to_lowercase());
    match reply {
        Reply::Respond { status, body } => {
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {length}\r\nconnection: close\r\n\r\n{body}",
                reason = if status < 400 { "OK" } else { "Error" },
                length = body.len(),
            );
            if stream.write_all(response.as_bytes()).await.is_ok() {
                let _ = stream.shutdown().await;
            }
        }
        Reply::Stall => {
            // Hold the connection open until the client gives up.
            let mut sink = [0_u8; 64];
            while matches!(stream.read(&mut sink).await, Ok(read) if read > 0) {}
        }
    }
}

async fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => head.extend_from_slice(&chunk[..read]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}
