//! Subprocess execution with combined output capture and bounded retries.
//!
//! Every external command the pipeline runs (git, package managers, build
//! tools, rsync, ssh) goes through [`CommandSpec`]. A spec is a reusable
//! description of an invocation, so the retry loop can rebuild the command
//! for each attempt.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info};

/// How many times a retried command is attempted in total.
pub const MAX_RETRIES: u32 = 3;

/// Pause between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Errors from running a subprocess.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with status {code:?}\noutput: {output}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        output: String,
    },
}

/// A reusable description of a subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// The invocation as a single printable line, for logs and errors.
    pub fn describe(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn build(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
    }

    /// Run the command once and return its combined stdout + stderr.
    ///
    /// A non-zero exit status is an error carrying the captured output.
    pub async fn output(&self) -> Result<String, ExecError> {
        let output = self
            .build()
            .output()
            .await
            .map_err(|source| ExecError::Spawn {
                command: self.describe(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(ExecError::NonZeroExit {
                command: self.describe(),
                code: output.status.code(),
                output: combined,
            })
        }
    }

    /// Run the command up to [`MAX_RETRIES`] times, sleeping [`RETRY_DELAY`]
    /// between attempts. Returns the output of the first successful attempt
    /// or the error of the last one.
    pub async fn run_with_retry(&self) -> Result<String, ExecError> {
        let mut attempt = 1;
        loop {
            info!(
                command = %self.describe(),
                attempt,
                max = MAX_RETRIES,
                "running command"
            );
            match self.output().await {
                Ok(output) => return Ok(output),
                Err(err) if attempt < MAX_RETRIES => {
                    error!(command = %self.describe(), attempt, %err, "command failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(command = %self.describe(), attempt, %err, "command failed");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
