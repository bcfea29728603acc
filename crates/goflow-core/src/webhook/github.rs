//! GitHub webhook authentication and payload parsing.
//!
//! GitHub signs the raw request body with HMAC-SHA1 keyed by the repository
//! secret and sends the digest as `X-Hub-Signature: sha1=<hex>`. The service
//! does not know in advance which repository a webhook belongs to, so
//! authentication doubles as repository matching: the first configured
//! repository whose secret reproduces the digest is the one the webhook is
//! for.

use crate::config::{PipelineConfig, RepositoryConfig};
use crate::webhook::{GithubPushPayload, PushEvent, WebhookError};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Event header value that triggers a pipeline.
pub const PUSH_EVENT: &str = "push";

/// Verify a `sha1=<hex>` signature over `payload` with `secret`.
///
/// The digest comparison runs in constant time; any malformed signature is
/// simply invalid.
pub fn verify_signature(secret: &str, signature: &str, payload: &[u8]) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha1=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Find the first configured repository whose secret validates `signature`
/// over `payload`.
pub fn match_repository<'a>(
    config: &'a PipelineConfig,
    signature: &str,
    payload: &[u8],
) -> Option<&'a RepositoryConfig> {
    config
        .repositories
        .iter()
        .find(|repo| verify_signature(&repo.secret, signature, payload))
}

/// Extract the push event from a GitHub webhook body.
pub fn parse_push(payload: &[u8]) -> Result<PushEvent, WebhookError> {
    let parsed: GithubPushPayload = serde_json::from_slice(payload)?;
    Ok(PushEvent {
        git_ref: parsed.git_ref,
        repo_url: parsed.repository.html_url,
    })
}

/// Compute the `sha1=<hex>` signature GitHub would send for `payload`.
///
/// Used by tests and by operators generating probe requests.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
