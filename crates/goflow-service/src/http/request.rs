//! HTTP/1.1 request parsing.

use crate::http::{APPLICATION_JSON, TEXT_PLAIN};
use std::collections::HashMap;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Errors reading or interpreting a request.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid HTTP request")]
    InvalidRequest,

    #[error("error reading request: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unsupported Content-Type: {0}")]
    UnsupportedContentType(String),
}

/// A request body interpreted according to its `Content-Type`.
#[derive(Debug)]
pub enum ParsedBody {
    Json(serde_json::Value),
    Text(String),
}

/// One parsed HTTP request.
///
/// Header keys keep the case they arrived with; [`HttpRequest::header`]
/// looks them up case-insensitively. `path_params` is populated by the
/// router at match time.
#[derive(Debug, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query_params: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Parse a single request from `reader`.
    ///
    /// The request line must split into exactly three space-separated
    /// tokens. Header lines without a `:` are ignored. The body is read
    /// only for POST and PUT, sized by `Content-Length`; a missing or
    /// unparsable length yields an empty body.
    pub async fn parse<R>(reader: &mut R) -> Result<Self, HttpError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await? == 0 {
            return Err(HttpError::InvalidRequest);
        }
        let parts: Vec<&str> = request_line.trim_end_matches(['\r', '\n']).split(' ').collect();
        let [method, target, _version] = parts[..] else {
            return Err(HttpError::InvalidRequest);
        };
        let method = method.to_string();

        let mut headers = HashMap::new();
        let mut content_type = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_string();
                let value = value.trim().to_string();
                if key.eq_ignore_ascii_case("Content-Type") {
                    content_type = value.clone();
                }
                headers.insert(key, value);
            }
        }

        let (path, query_params) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), parse_query(query)),
            None => (target.to_string(), HashMap::new()),
        };

        let mut body = Vec::new();
        if method == "POST" || method == "PUT" {
            let length = lookup(&headers, "Content-Length")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if length > 0 {
                body = vec![0u8; length];
                reader.read_exact(&mut body).await?;
            }
        }

        Ok(Self {
            method,
            path,
            query_params,
            path_params: HashMap::new(),
            headers,
            content_type,
            body,
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_params.get(key).map(String::as_str)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.path_params.get(key).map(String::as_str)
    }

    /// Interpret the body according to its `Content-Type`.
    pub fn parse_body(&self) -> Result<ParsedBody, HttpError> {
        match self.content_type.as_str() {
            APPLICATION_JSON => Ok(ParsedBody::Json(serde_json::from_slice(&self.body)?)),
            TEXT_PLAIN => Ok(ParsedBody::Text(
                String::from_utf8_lossy(&self.body).into_owned(),
            )),
            other => Err(HttpError::UnsupportedContentType(other.to_string())),
        }
    }
}

/// Split a query string into key/value pairs. Pairs that do not split into
/// exactly one key and one value are silently dropped.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&') {
        let parts: Vec<&str> = pair.split('=').collect();
        if let [key, value] = parts[..] {
            params.insert(key.to_string(), value.to_string());
        }
    }
    params
}

fn lookup<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
