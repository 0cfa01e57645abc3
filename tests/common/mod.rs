//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use neons_redirect::config::NodeConfig;
use neons_redirect::rules::{InMemoryRuleStore, RedirectRule, RuleStore, RuleUpdate, StoreResult};

/// A `resolve` result whose stack holds `record` base64-encoded.
pub fn stack_response(record: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(record);
    raw_stack_response(&encoded)
}

/// A `resolve` result with `value` placed verbatim in `stack[0]`.
pub fn raw_stack_response(value: &str) -> String {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "script": "DAh0ZXN0Lm5lbw==",
            "state": "HALT",
            "gasconsumed": "1007390",
            "exception": null,
            "stack": [{ "type": "ByteString", "value": value }]
        }
    })
    .to_string()
}

/// Node config pointing at `addr`.
#[allow(dead_code)]
pub fn node_config(addr: SocketAddr) -> NodeConfig {
    NodeConfig {
        rpc_url: format!("http://{}", addr),
        ..NodeConfig::default()
    }
}

/// Start a programmable mock JSON-RPC node on an ephemeral port.
///
/// `handler` receives each request body and returns `(status, body)`.
pub async fn start_mock_node<F>(handler: F) -> SocketAddr
where
    F: Fn(String) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request_body(&mut socket).await else {
                            return;
                        };
                        let (status, body) = handler(body);
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a node that accepts connections and drops them without answering.
#[allow(dead_code)]
pub async fn start_dropping_node() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = read_request_body(&mut socket).await;
            drop(socket);
        }
    });

    addr
}

/// Start a node that reads each request and never answers.
#[allow(dead_code)]
pub async fn start_silent_node() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = read_request_body(&mut socket).await;
            held.push(socket);
        }
    });

    addr
}

async fn read_request_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(String::from_utf8_lossy(&buf[header_end..]).into_owned())
}

/// Rule store that records every update it is asked to apply.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryRuleStore,
    updates: Mutex<Vec<RuleUpdate>>,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn with_rules(rules: impl IntoIterator<Item = RedirectRule>) -> Self {
        Self {
            inner: InMemoryRuleStore::with_rules(rules),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<RuleUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuleStore for RecordingStore {
    async fn get_dynamic_rules(&self) -> StoreResult<Vec<RedirectRule>> {
        self.inner.get_dynamic_rules().await
    }

    async fn update_dynamic_rules(&self, update: RuleUpdate) -> StoreResult<()> {
        self.updates.lock().unwrap().push(update.clone());
        self.inner.update_dynamic_rules(update).await
    }
}
