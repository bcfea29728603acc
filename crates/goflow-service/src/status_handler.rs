//! `GET /status`: dump the pipeline status registry.

use crate::http::router::Handler;
use crate::http::{status_text, HttpContext};
use crate::responses::respond_json;
use async_trait::async_trait;
use goflow_core::status::StatusRegistry;
use serde_json::json;
use std::sync::Arc;

/// Handler exposing every pipeline's lifecycle state.
pub struct StatusHandler {
    registry: Arc<StatusRegistry>,
}

impl StatusHandler {
    pub fn new(registry: Arc<StatusRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Handler for StatusHandler {
    async fn handle(&self, ctx: &mut HttpContext) {
        let statuses = self.registry.snapshot();
        respond_json(
            ctx,
            200,
            json!({
                "data": statuses,
                "message": status_text(200),
            }),
        );
    }
}

#[cfg(test)]
#[path = "status_handler_tests.rs"]
mod tests;
