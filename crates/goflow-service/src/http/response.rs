//! HTTP/1.1 response serialization.

use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Reason phrase for the status codes this service emits. Anything else is
/// `Unknown`.
pub fn status_text(status_code: u16) -> &'static str {
    match status_code {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// The response a handler builds and the server writes back.
#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16, body: Vec<u8>) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body,
        }
    }

    /// Serialize the response: status line, headers, blank line, body.
    ///
    /// `Content-Length` is filled in from the body when a body exists and
    /// the header was not set explicitly.
    pub async fn write_to<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        if !self.body.is_empty()
            && !self
                .headers
                .keys()
                .any(|key| key.eq_ignore_ascii_case("Content-Length"))
        {
            self.headers
                .insert("Content-Length".to_string(), self.body.len().to_string());
        }

        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status_code,
            status_text(self.status_code)
        );
        for (key, value) in &self.headers {
            head.push_str(key);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        writer.write_all(head.as_bytes()).await?;
        if !self.body.is_empty() {
            writer.write_all(&self.body).await?;
        }
        writer.flush().await
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
