//! Shared helpers for integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use async_trait::async_trait;
use devtools_mcp::{
    ExecutionContext, McpHandler, McpServer, McpServerBuilder, ServerConfig,
    server::{AppState, AppStateBuilder},
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Minimal HTTP/1.1 response.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Send one request with `Connection: close` and read the whole response.
pub async fn http(addr: SocketAddr, method: &str, path: &str, body: &str) -> HttpResponse {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let request = format!(
        "{method} {path} HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read");

    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    let head = String::from_utf8_lossy(&raw[..split]).to_string();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    HttpResponse {
        status,
        headers,
        body,
    }
}

pub async fn rpc(addr: SocketAddr, request: Value) -> Value {
    http(addr, "POST", "/", &request.to_string()).await.json()
}

/// Stand-in host that answers every tool with canned data.
#[derive(Default)]
pub struct FakeHost {
    pub calls: AtomicUsize,
}

impl FakeHost {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionContext for FakeHost {
    async fn invoke(&self, tool: &str, args: Value) -> Result<Value, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match tool {
            "evaluate_code" => match args["code"].as_str() {
                Some("document.title") => Ok(json!("Inspector")),
                Some("sleep") => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Value::Null)
                }
                Some(code) => Err(format!("SyntaxError: Unexpected token in {}", code)),
                None => Err("code must be a string".into()),
            },
            "inspect_element" => Ok(json!({
                "found": false,
                "selector": args["selector"],
            })),
            "get_store" => Ok(json!({
                "store": args["storeName"],
                "methods": ["getCurrentUser", "getUsers"],
            })),
            _ => Ok(Value::Null),
        }
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .name("devtools-mcp-test")
        .version("0.0.1")
        .tool_timeout(Duration::from_millis(300))
        .build()
        .expect("valid config")
}

pub fn build_server(config: ServerConfig) -> (McpServer<McpHandler>, Arc<AppState>) {
    let state = Arc::new(
        AppStateBuilder::new()
            .config(config.clone())
            .build()
            .expect("state"),
    );
    let server = McpServerBuilder::new()
        .handler(McpHandler::new(Arc::clone(&state)))
        .config(config)
        .build()
        .expect("server");
    (server, state)
}
