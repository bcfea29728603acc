//! Pipeline orchestration: provision → build → test → deploy.
//!
//! A [`Pipeline`] owns its workspace exclusively. Stages run in strict
//! order; the first failure aborts the remainder and its error is what the
//! status registry records. The workspace is removed when the run returns,
//! on every path.

mod build;
mod deploy;

pub use build::BuildError;
pub use deploy::DeployError;
pub use test::TestError;

use crate::config::PipelineConfig;
use crate::git::Workspace;
use crate::provision::{self, ProvisionError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Failure of one pipeline run, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("environment setup failed: {0}")]
    Provision(#[from] ProvisionError),

    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    #[error("test failed: {0}")]
    Test(#[from] TestError),

    #[error("deploy failed: {0}")]
    Deploy(#[from] DeployError),
}

/// One pipeline instance: the shared configuration plus an exclusively
/// owned checkout.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    workspace: Workspace,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, workspace: Workspace) -> Self {
        Self { config, workspace }
    }

    /// Run all stages. Consumes the pipeline; the workspace is deleted when
    /// this returns, whatever the outcome.
    pub async fn run(self) -> Result<(), PipelineError> {
        info!(workspace = %self.workspace.path().display(), "starting pipeline");
        let result = self.execute().await;
        match &result {
            Ok(()) => info!("pipeline completed successfully"),
            Err(err) => error!(%err, "pipeline failed"),
        }
        result
    }

    async fn execute(&self) -> Result<(), PipelineError> {
        provision::ensure_environment(&self.config.build.kind, &self.config.build.version).await?;
        build::run(&self.config, self.workspace.path()).await?;
        test::run(&self.config, self.workspace.path()).await?;
        deploy::run(&self.config, self.workspace.path()).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
