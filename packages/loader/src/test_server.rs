//! A scripted HTTP/1.1 server on a loopback port.
//!
//! Each path answers with its list of replies in order, repeating the last
//! one; unknown paths answer 404. Every request closes its connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub enum Reply {
    /// Empty body with this status.
    Status(u16),
    /// 200 with this body.
    Body(String),
    /// Never answers.
    Stall,
}

type Routes = HashMap<String, Vec<Reply>>;
type Hits = Arc<Mutex<HashMap<String, usize>>>;

pub struct TestServer {
    pub base_url: String,
    hits: Hits,
}

impl TestServer {
    pub async fn start(routes: impl IntoIterator<Item = (String, Vec<Reply>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<Routes> = Arc::new(routes.into_iter().collect());
        let hits: Hits = Arc::default();

        tokio::spawn({
            let hits = hits.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(answer(stream, routes.clone(), hits.clone()));
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// Requests received for `path` so far.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

async fn answer(mut stream: TcpStream, routes: Arc<Routes>, hits: Hits) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&request);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let attempt = {
        let mut hits = hits.lock().unwrap();
        let count = hits.entry(path.clone()).or_insert(0);
        *count += 1;
        *count
    };

    let reply = routes
        .get(&path)
        .and_then(|replies| replies.get(attempt - 1).or_else(|| replies.last()))
        .cloned()
        .unwrap_or(Reply::Status(404));

    let (status, body) = match reply {
        Reply::Stall => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            return;
        }
        Reply::Status(status) => (status, String::new()),
        Reply::Body(body) => (200, body),
    };

    let response = format!(
        "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
