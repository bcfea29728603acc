//! Process-wide pipeline status registry.
//!
//! Maps a pipeline id (`<repo-url>-<git-ref>`) to its lifecycle state. One
//! mutex guards every read and write; entries are never garbage-collected
//! and the last write for an id wins.
//!
//! The registry is constructed at startup and injected as an
//! `Arc<StatusRegistry>` collaborator rather than living behind a global.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Lifecycle state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Running,
    Success,
    Failed,
}

/// One registry entry, shaped for the `/status` JSON view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub id: String,
    pub status: PipelineState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// The identifier a webhook-triggered pipeline is registered under.
pub fn pipeline_id(repo_url: &str, git_ref: &str) -> String {
    format!("{}-{}", repo_url, git_ref)
}

/// Mutex-guarded id → status map.
#[derive(Debug, Default)]
pub struct StatusRegistry {
    entries: Mutex<HashMap<String, PipelineStatus>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state for `id`, replacing any previous entry.
    pub fn record(&self, id: &str, status: PipelineState, error: &str) {
        let entry = PipelineStatus {
            id: id.to_string(),
            status,
            error: error.to_string(),
        };
        self.lock().insert(id.to_string(), entry);
    }

    pub fn get(&self, id: &str) -> Option<PipelineStatus> {
        self.lock().get(id).cloned()
    }

    /// A point-in-time copy of every entry.
    pub fn snapshot(&self) -> HashMap<String, PipelineStatus> {
        self.lock().clone()
    }

    // A poisoned lock only means another holder panicked mid-insert; the
    // map itself is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PipelineStatus>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
