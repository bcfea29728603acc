//! A minimal HTTP/1.1 transport built directly on TCP.
//!
//! One request and one response per accepted connection; no keep-alive, no
//! chunked transfer encoding, no HTTP/2. Each connection runs in its own
//! task, so the accept loop never blocks on a handler.
//!
//! Known hardening gaps, accepted for the webhook threat model: there are no
//! request timeouts and no body size limits, so a declared `Content-Length`
//! larger than the data actually sent parks the connection task until the
//! peer closes.

pub mod context;
pub mod request;
pub mod response;
pub mod router;
pub mod server;

pub use context::HttpContext;
pub use request::{HttpError, HttpRequest, ParsedBody};
pub use response::{status_text, HttpResponse};
pub use router::{Handler, Resolution, Router};
pub use server::{BoundServer, HttpServer};

/// `Content-Type` value for JSON responses and parsed JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// `Content-Type` value for plain-text responses and bodies.
pub const TEXT_PLAIN: &str = "text/plain";
