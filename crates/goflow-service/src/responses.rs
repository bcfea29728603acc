//! Response helpers shared by the handlers.

use crate::http::{status_text, HttpContext};
use tracing::error;

/// Set a JSON response, falling back to a plain 500 when the value cannot
/// be serialized.
pub fn respond_json(ctx: &mut HttpContext, status_code: u16, value: serde_json::Value) {
    if let Err(err) = ctx.json(status_code, &value) {
        error!(%err, "failed to serialize response body");
        ctx.text(500, status_text(500));
    }
}
