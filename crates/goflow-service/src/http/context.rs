//! Per-connection handler context.

use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::{APPLICATION_JSON, TEXT_PLAIN};
use serde::Serialize;

/// The request a handler reads and the response it fills in.
pub struct HttpContext {
    pub request: HttpRequest,
    pub response: HttpResponse,
}

impl HttpContext {
    /// Wrap a parsed request with an empty 200 response.
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            response: HttpResponse::new(200, Vec::new()),
        }
    }

    /// Set a JSON response.
    ///
    /// On serialization failure the response is left untouched and the
    /// error is returned; the caller decides what to send instead.
    pub fn json<T: Serialize>(
        &mut self,
        status_code: u16,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.response.status_code = status_code;
        self.response.body = body;
        self.response
            .headers
            .insert("Content-Type".to_string(), APPLICATION_JSON.to_string());
        Ok(())
    }

    /// Set a plain-text response. Never fails.
    pub fn text(&mut self, status_code: u16, body: impl Into<String>) {
        self.response.status_code = status_code;
        self.response.body = body.into().into_bytes();
        self.response
            .headers
            .insert("Content-Type".to_string(), TEXT_PLAIN.to_string());
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.query(key)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.request.param(key)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
