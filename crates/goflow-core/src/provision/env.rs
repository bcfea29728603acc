//! Environment mutation helpers shared by the toolchain installers.
//!
//! Every export is applied to the process environment and appended to
//! [`ENV_SETUP_FILE`] in the working directory. The file is append-only and
//! never rotated; each export is one small write, so concurrent writers can
//! interleave lines but not corrupt them.

use crate::executor::CommandSpec;
use crate::provision::ProvisionError;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Shell file mirroring every environment export of this process.
pub const ENV_SETUP_FILE: &str = "env_setup.sh";

/// Set `key=value` in the process environment and persist the export.
pub(crate) fn set_env_var(key: &str, value: &str) -> Result<(), ProvisionError> {
    std::env::set_var(key, value);
    debug!(key, value, "environment variable set");
    append_export(Path::new(ENV_SETUP_FILE), key, value)?;
    Ok(())
}

/// Append `dir` to `PATH` unless it is already present.
pub(crate) fn append_to_path(dir: &Path) -> Result<(), ProvisionError> {
    let addition = dir.display().to_string();
    let current = std::env::var("PATH").unwrap_or_default();
    if current.split(':').any(|entry| entry == addition) {
        info!(dir = %addition, "already on PATH");
        return Ok(());
    }
    let updated = format!("{}:{}", current, addition);
    std::env::set_var("PATH", &updated);
    debug!(dir = %addition, "appended to PATH");
    append_export(Path::new(ENV_SETUP_FILE), "PATH", &updated)?;
    Ok(())
}

/// Append one `export KEY=VALUE` line to `file`.
fn append_export(file: &Path, key: &str, value: &str) -> std::io::Result<()> {
    let mut handle = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)?;
    writeln!(handle, "export {}={}", key, value)
}

/// Run `<tool> <flag>` and return its trimmed combined output.
pub(crate) async fn tool_version(
    tool: &str,
    flag: &str,
) -> Result<String, crate::executor::ExecError> {
    let output = CommandSpec::new(tool).arg(flag).output().await?;
    Ok(output.trim().to_string())
}

/// Confirm `tool` answers `--version` after an install.
pub(crate) async fn verify_tool(tool: &'static str) -> Result<(), ProvisionError> {
    match tool_version(tool, "--version").await {
        Ok(version) => {
            info!(tool, version = %version.lines().next().unwrap_or_default(), "tool verified");
            Ok(())
        }
        Err(source) => Err(ProvisionError::ToolUnusable { tool, source }),
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
