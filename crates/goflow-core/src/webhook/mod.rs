//! Webhook authentication and payload parsing for the supported forges.
//!
//! The HTTP layer hands this module raw header values and the raw body; it
//! answers three questions: which forge sent this, which configured
//! repository (if any) does the credential authenticate, and what push does
//! the payload describe.

pub mod github;
pub mod gitlab;

use serde::Deserialize;
use thiserror::Error;

/// Header whose presence identifies a GitHub webhook.
pub const X_GITHUB_EVENT: &str = "X-Github-Event";

/// Header whose presence identifies a GitLab webhook.
pub const X_GITLAB_EVENT: &str = "X-Gitlab-Event";

/// Header carrying the GitHub HMAC-SHA1 signature.
pub const X_HUB_SIGNATURE: &str = "X-Hub-Signature";

/// Header carrying the GitLab secret token.
pub const X_GITLAB_TOKEN: &str = "X-Gitlab-Token";

/// The forges that can trigger a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forge {
    Github,
    Gitlab,
}

impl Forge {
    /// Identify the sending forge from its event header values. `None` when
    /// neither header is present.
    pub fn detect(github_event: Option<&str>, gitlab_event: Option<&str>) -> Option<Self> {
        if github_event.is_some() {
            Some(Self::Github)
        } else if gitlab_event.is_some() {
            Some(Self::Gitlab)
        } else {
            None
        }
    }
}

/// Errors extracting a push event from a webhook body.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// The subset of a push payload the dispatcher consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    /// Fully-qualified ref, e.g. `refs/heads/main`.
    pub git_ref: String,

    /// Repository URL as reported by the forge.
    pub repo_url: String,
}

impl PushEvent {
    /// Whether this push targets the given configured branch.
    pub fn targets_branch(&self, branch: &str) -> bool {
        self.git_ref == format!("refs/heads/{}", branch)
    }
}

#[derive(Deserialize)]
struct GithubPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    repository: GithubRepository,
}

#[derive(Deserialize)]
struct GithubRepository {
    html_url: String,
}

#[derive(Deserialize)]
struct GitlabPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    project: GitlabProject,
}

#[derive(Deserialize)]
struct GitlabProject {
    web_url: String,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
