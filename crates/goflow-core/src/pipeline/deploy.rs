//! Deploy stage: rsync over SSH, sequential post-deploy commands, rollback.
//!
//! Only the `ssh` method is implemented. When any deploy step fails, the
//! rollback fires: the configured local script if one is set, otherwise a
//! default remote cleanup. The original deploy error is the one the caller
//! sees; rollback failures are only logged.

use crate::config::{PipelineConfig, SshConfig};
use crate::executor::{CommandSpec, ExecError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from the deploy stage.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("unsupported deploy method: {0}")]
    UnsupportedMethod(String),

    #[error("SSH config missing")]
    MissingSshConfig,

    #[error("incomplete SSH configuration")]
    IncompleteSshConfig,

    #[error("build artifacts not found at {}", .path.display())]
    ArtifactsMissing { path: PathBuf },

    #[error("rsync failed: {0}")]
    Rsync(#[source] ExecError),

    #[error("post-deploy command '{command}' failed: {source}")]
    PostDeploy {
        command: String,
        source: ExecError,
    },

    #[error("rollback script failed: {0}")]
    RollbackScript(#[source] ExecError),

    #[error("remote rollback failed: {0}")]
    RemoteRollback(#[source] ExecError),
}

/// Run the configured deployment, if any. `workspace` is the working
/// directory a rollback script runs in.
pub(crate) async fn run(config: &PipelineConfig, workspace: &Path) -> Result<(), DeployError> {
    match config.deploy.method.as_str() {
        "" => {
            info!("no deployment configured, skipping deploy stage");
            Ok(())
        }
        "ssh" => match deploy_ssh(config).await {
            Ok(()) => {
                info!("deploy stage complete");
                Ok(())
            }
            Err(err) => {
                error!(%err, "SSH deployment failed, executing rollback");
                if let Err(rollback_err) = rollback(config, workspace).await {
                    error!(%rollback_err, "rollback failed");
                } else {
                    info!("rollback complete");
                }
                Err(err)
            }
        },
        other => Err(DeployError::UnsupportedMethod(other.to_string())),
    }
}

async fn deploy_ssh(config: &PipelineConfig) -> Result<(), DeployError> {
    let ssh = config.deploy.ssh.as_ref().ok_or(DeployError::MissingSshConfig)?;
    if ssh.remote_user.is_empty()
        || ssh.remote_host.is_empty()
        || ssh.remote_path.is_empty()
        || ssh.key_path.is_empty()
    {
        return Err(DeployError::IncompleteSshConfig);
    }

    let artifacts = Path::new(&config.build.output_path);
    if !artifacts.exists() {
        return Err(DeployError::ArtifactsMissing {
            path: artifacts.to_path_buf(),
        });
    }

    // Trailing slash selects rsync's "contents of" semantics.
    let mut source = config.build.output_path.clone();
    if !source.ends_with('/') {
        source.push('/');
    }
    let destination = format!("{}@{}:{}", ssh.remote_user, ssh.remote_host, ssh.remote_path);

    let mut rsync = CommandSpec::new("rsync")
        .arg("-e")
        .arg(ssh_transport(ssh))
        .arg("-avz");
    if !ssh.rsync_options.is_empty() {
        rsync = rsync.args(ssh.rsync_options.split_whitespace().map(String::from));
    }
    let rsync = rsync.arg(source).arg(destination);
    info!(command = %rsync.describe(), "syncing artifacts");
    rsync.run_with_retry().await.map_err(DeployError::Rsync)?;

    for command in &config.deploy.post_deploy_cmds {
        info!(command = %command, "running post-deploy command");
        remote_command(ssh, command)
            .run_with_retry()
            .await
            .map_err(|source| DeployError::PostDeploy {
                command: command.clone(),
                source,
            })?;
    }

    info!("SSH deployment successful");
    Ok(())
}

/// Remediate a failed deploy: run the configured local script with `bash` in
/// the workspace, or fall back to wiping the remote path.
async fn rollback(config: &PipelineConfig, workspace: &Path) -> Result<(), DeployError> {
    if !config.deploy.rollback_script.is_empty() {
        warn!(script = %config.deploy.rollback_script, "running rollback script");
        CommandSpec::new("bash")
            .arg(config.deploy.rollback_script.as_str())
            .current_dir(workspace)
            .output()
            .await
            .map_err(DeployError::RollbackScript)?;
        return Ok(());
    }

    let ssh = config.deploy.ssh.as_ref().ok_or(DeployError::MissingSshConfig)?;
    warn!(path = %ssh.remote_path, "no rollback script, removing deployed files");
    remote_command(ssh, &format!("rm -rf {}/*", ssh.remote_path))
        .output()
        .await
        .map_err(DeployError::RemoteRollback)?;
    Ok(())
}

fn ssh_transport(ssh: &SshConfig) -> String {
    format!("ssh -i {} -o StrictHostKeyChecking=no", ssh.key_path)
}

fn remote_command(ssh: &SshConfig, command: &str) -> CommandSpec {
    CommandSpec::new("ssh")
        .args(["-i", ssh.key_path.as_str(), "-o", "StrictHostKeyChecking=no"])
        .arg(format!("{}@{}", ssh.remote_user, ssh.remote_host))
        .arg(command)
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
