//! # GoFlow HTTP Service
//!
//! The HTTP surface of the GoFlow CI service: a from-scratch HTTP/1.1
//! transport, a parameterized router, and the handlers for the webhook and
//! status endpoints plus the demo product catalog.
//!
//! The service endpoints:
//! - `POST /webhook` accepts forge push events and launches pipelines
//! - `GET /status` lists pipeline statuses
//!
//! Handlers hold their collaborators (`PipelineConfig`, `StatusRegistry`)
//! behind `Arc`s injected at construction; nothing in this crate reaches
//! for globals.

pub mod http;
pub mod products;
pub mod responses;
pub mod status_handler;
pub mod webhook_handler;

pub use http::HttpServer;
pub use status_handler::StatusHandler;
pub use webhook_handler::WebhookHandler;

use goflow_core::config::PipelineConfig;
use goflow_core::status::StatusRegistry;
use products::{CreateProduct, GetProduct, ListProducts, ProductCatalog, QueryProducts};
use std::sync::Arc;

/// Build the server with every route registered.
pub fn create_server(
    addr: &str,
    config: Arc<PipelineConfig>,
    registry: Arc<StatusRegistry>,
) -> HttpServer {
    let mut server = HttpServer::new(addr);

    server.post("/webhook", Arc::new(WebhookHandler::new(config, registry.clone())));
    server.get("/status", Arc::new(StatusHandler::new(registry)));

    // Demo surface; `/products/query` sits beside `/products/:id` on
    // purpose to exercise literal-over-parameter routing precedence.
    let catalog = Arc::new(ProductCatalog::with_samples());
    server.get("/products", Arc::new(ListProducts::new(catalog.clone())));
    server.get("/products/:id", Arc::new(GetProduct::new(catalog.clone())));
    server.get("/products/query", Arc::new(QueryProducts::new(catalog.clone())));
    server.post("/products", Arc::new(CreateProduct::new(catalog)));

    server
}
