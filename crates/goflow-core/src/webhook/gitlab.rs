//! GitLab webhook authentication and payload parsing.
//!
//! GitLab does not sign the body; it echoes the configured secret verbatim
//! in `X-Gitlab-Token`. Matching is a constant-time string comparison
//! against each configured repository secret.

use crate::config::{PipelineConfig, RepositoryConfig};
use crate::webhook::{GitlabPushPayload, PushEvent, WebhookError};
use subtle::ConstantTimeEq;

/// Event header value that triggers a pipeline.
pub const PUSH_HOOK: &str = "Push Hook";

/// Constant-time comparison of the presented token against a secret.
pub fn token_matches(secret: &str, token: &str) -> bool {
    secret.as_bytes().ct_eq(token.as_bytes()).into()
}

/// Find the first configured repository whose secret equals `token`.
pub fn match_repository<'a>(
    config: &'a PipelineConfig,
    token: &str,
) -> Option<&'a RepositoryConfig> {
    config
        .repositories
        .iter()
        .find(|repo| token_matches(&repo.secret, token))
}

/// Extract the push event from a GitLab webhook body.
pub fn parse_push(payload: &[u8]) -> Result<PushEvent, WebhookError> {
    let parsed: GitlabPushPayload = serde_json::from_slice(payload)?;
    Ok(PushEvent {
        git_ref: parsed.git_ref,
        repo_url: parsed.project.web_url,
    })
}

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;
