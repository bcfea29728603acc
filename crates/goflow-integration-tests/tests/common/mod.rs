//! Shared fixtures for socket-level integration tests.
//!
//! The service is exercised exactly the way a forge would: a real TCP
//! connection carrying hand-written HTTP/1.1 bytes. No HTTP client library
//! is involved, so the tests also pin down the wire format of the
//! from-scratch transport.

use goflow_core::config::{BuildConfig, PipelineConfig, RepositoryConfig};
use goflow_core::status::StatusRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// The secret the test repository is configured with.
pub const SECRET: &str = "supersecret1";

/// A service instance bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    #[allow(dead_code)]
    pub registry: Arc<StatusRegistry>,
    _artifacts: tempfile::TempDir,
}

/// Spawn the full service for `repo_url`.
///
/// The build type is deliberately not a provisionable toolchain, so any
/// pipeline that does start fails fast and deterministically instead of
/// attempting package installs on the test host.
pub async fn spawn_server(repo_url: &str) -> TestServer {
    let artifacts = tempfile::tempdir().unwrap();
    let config = Arc::new(PipelineConfig {
        repositories: vec![RepositoryConfig {
            url: repo_url.to_string(),
            branch: "main".to_string(),
            secret: SECRET.to_string(),
        }],
        build: BuildConfig {
            kind: "python".to_string(),
            output_path: artifacts.path().join("out").display().to_string(),
            version: String::new(),
        },
        ..Default::default()
    });
    let registry = Arc::new(StatusRegistry::new());

    let server = goflow_service::create_server("127.0.0.1:0", config, registry.clone());
    let bound = server.bind().await.unwrap();
    let addr = bound.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = bound.serve().await;
    });

    TestServer {
        addr,
        registry,
        _artifacts: artifacts,
    }
}

/// A response split into its parts.
#[derive(Debug)]
pub struct RawResponse {
    pub status_code: u16,
    #[allow(dead_code)]
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Write raw bytes to the server and read the response until it closes the
/// connection.
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer).await.unwrap();
    parse_response(&buffer)
}

/// Build a well-formed HTTP/1.1 request.
pub fn http_request(method: &str, path: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut request = format!("{} {} HTTP/1.1\r\n", method, path);
    for (key, value) in headers {
        request.push_str(&format!("{}: {}\r\n", key, value));
    }
    if !body.is_empty() {
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");
    let mut bytes = request.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

/// Convenience wrapper: send a built request.
pub async fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> RawResponse {
    send_raw(addr, &http_request(method, path, headers, body)).await
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let text = String::from_utf8_lossy(raw);
    let (head, body) = text
        .split_once("\r\n\r\n")
        .unwrap_or_else(|| panic!("response without header terminator: {:?}", text));

    let mut lines = head.lines();
    let status_line = lines.next().expect("missing status line").to_string();
    let status_code = status_line
        .split(' ')
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or_else(|| panic!("unparsable status line: {}", status_line));
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    RawResponse {
        status_code,
        status_line,
        headers,
        body: body.to_string(),
    }
}

/// Compute the GitHub signature header value for `body`.
#[allow(dead_code)]
pub fn github_signature(secret: &str, body: &[u8]) -> String {
    goflow_core::webhook::github::sign(secret, body)
}
