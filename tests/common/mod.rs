//! Shared utilities for integration tests: a programmable mock of the OKX REST
//! API and of a chain's JSON-RPC node.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use okx_dex_sdk::api::Credentials;
use okx_dex_sdk::Settings;

pub const API_KEY: &str = "test-key";
pub const SECRET_KEY: &str = "test-secret";
pub const PASSPHRASE: &str = "test-passphrase";
pub const PROJECT_ID: &str = "test-project";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string, as sent on the request line.
    pub path: String,
    /// Lowercased header names.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Path without the query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    /// JSON-RPC method name, if the body is a JSON-RPC call.
    pub fn rpc_method(&self) -> Option<String> {
        let call: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        call["method"].as_str().map(str::to_string)
    }
}

pub struct MockOkx {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockOkx {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, route: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.route() == route)
            .collect()
    }

    /// Params of every JSON-RPC call to `method`, in arrival order.
    pub fn rpc_calls(&self, method: &str) -> Vec<serde_json::Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.rpc_method().as_deref() == Some(method))
            .filter_map(|r| serde_json::from_str::<serde_json::Value>(&r.body).ok())
            .map(|call| call["params"].clone())
            .collect()
    }
}

/// `{"code":"0","msg":"","data":<data>}`.
pub fn ok_envelope(data: serde_json::Value) -> String {
    serde_json::json!({ "code": "0", "msg": "", "data": data }).to_string()
}

/// Start a mock on an ephemeral port. `respond` maps each request to
/// `(status, body)`.
pub async fn start_mock_okx<F>(respond: F) -> MockOkx
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let respond = respond.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let _ = handle(socket, respond, recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOkx { addr, requests }
}

/// Start a JSON-RPC node mock. `respond` maps `(method, params)` to the call's
/// `result`, or to `(code, message)` for an error object.
pub async fn start_mock_rpc<F>(respond: F) -> MockOkx
where
    F: Fn(&str, &serde_json::Value) -> Result<serde_json::Value, (i64, String)>
        + Send
        + Sync
        + 'static,
{
    start_mock_okx(move |request| {
        let call: serde_json::Value = match serde_json::from_str(&request.body) {
            Ok(call) => call,
            Err(_) => return (400, String::new()),
        };
        let id = call["id"].clone();
        let method = call["method"].as_str().unwrap_or_default();

        let reply = match respond(method, &call["params"]) {
            Ok(result) => serde_json::json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err((code, message)) => serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": code, "message": message }
            }),
        };
        (200, reply.to_string())
    })
    .await
}

async fn handle<F>(
    mut socket: TcpStream,
    respond: Arc<F>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()>
where
    F: Fn(&RecordedRequest) -> (u16, String),
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    let request = RecordedRequest {
        method,
        path,
        headers,
        body,
    };
    let (status, body) = respond(&request);
    recorded.lock().unwrap().push(request);

    let status_text = match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        401 => "401 Unauthorized",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

pub fn credentials() -> Credentials {
    Credentials::new(API_KEY, SECRET_KEY, PASSPHRASE, Some(PROJECT_ID.to_string()))
}

/// Validated settings pointing at `base_url`, plus any extra variables.
pub fn settings(base_url: &str, extra: &[(&str, &str)]) -> Settings {
    let mut vars = vec![
        ("OKX_API_KEY", API_KEY),
        ("OKX_SECRET_KEY", SECRET_KEY),
        ("OKX_API_PASSPHRASE", PASSPHRASE),
        ("OKX_PROJECT_ID", PROJECT_ID),
        ("OKX_BASE_URL", base_url),
        ("OKX_REQUEST_TIMEOUT_SECS", "5"),
    ];
    vars.extend_from_slice(extra);
    Settings::from_vars(vars.into_iter().map(|(k, v)| (k, v.to_string()))).unwrap()
}
