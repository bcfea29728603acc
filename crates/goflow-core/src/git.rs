//! Shallow cloning into ephemeral, exclusively-owned workspaces.
//!
//! A [`Workspace`] wraps a fresh OS temp directory. Dropping it removes the
//! directory, which is the single cleanup mechanism for every exit path of a
//! pipeline run, whether it succeeded, failed a stage, or unwound.

use crate::executor::{CommandSpec, ExecError};
use std::path::Path;
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info};

/// Errors while preparing a workspace from a repository.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("repository URL cannot be empty")]
    EmptyUrl,

    #[error("branch cannot be empty")]
    EmptyBranch,

    #[error("invalid repository URL: {0} (must start with http://, https://, git@, or file://)")]
    InvalidUrl(String),

    #[error("failed to create temp directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("clone failed: {0}")]
    CloneFailed(#[source] ExecError),

    #[error("cloned directory {0} is not a valid Git repository")]
    NotARepository(String),
}

/// An ephemeral directory holding one pipeline's checkout.
///
/// The directory is exclusive to the pipeline instance that owns this value
/// and is deleted when the value drops.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create an empty workspace with the given temp-dir prefix.
    pub fn create(prefix: &str) -> Result<Self, GitError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(GitError::TempDir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Clone `branch` of `url` into a fresh workspace.
///
/// The clone is shallow (`--depth 1`) and single-branch. On any failure the
/// partially-written directory is removed before the error is returned.
pub async fn clone_repository(url: &str, branch: &str) -> Result<Workspace, GitError> {
    if url.is_empty() {
        return Err(GitError::EmptyUrl);
    }
    if branch.is_empty() {
        return Err(GitError::EmptyBranch);
    }
    validate_repo_url(url)?;

    let workspace = Workspace::create(&format!("goflow-{}-", sanitized_repo_name(url)))?;
    info!(url, branch, path = %workspace.path().display(), "cloning repository");

    let clone = CommandSpec::new("git")
        .args(["clone", "--depth", "1", "-b", branch, url])
        .arg(workspace.path().display().to_string());
    // Workspace drop cleans up the partial clone on the error path.
    clone.output().await.map_err(GitError::CloneFailed)?;

    if !workspace.path().join(".git").exists() {
        return Err(GitError::NotARepository(
            workspace.path().display().to_string(),
        ));
    }

    debug!(path = %workspace.path().display(), "clone complete");
    Ok(workspace)
}

fn validate_repo_url(url: &str) -> Result<(), GitError> {
    let lowered = url.to_lowercase();
    if ["http://", "https://", "git@", "file://"]
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        Ok(())
    } else {
        Err(GitError::InvalidUrl(url.to_string()))
    }
}

/// Derive a filesystem-safe temp-dir prefix from a clone URL: the last two
/// path segments, joined and stripped of anything that is not alphanumeric,
/// `-`, `_`, or `.`.
fn sanitized_repo_name(url: &str) -> String {
    let trimmed = url.trim_end_matches(".git");
    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return "default-repo".to_string();
    }
    let raw = format!(
        "{}-{}",
        segments[segments.len() - 2],
        segments[segments.len() - 1]
    );
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
