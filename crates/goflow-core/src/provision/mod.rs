//! Toolchain provisioning: make sure the compiler and build tools a pipeline
//! needs are installed and on `PATH` before the build stage runs.
//!
//! Provisioning mutates the process environment (`PATH`, `DOTNET_ROOT`,
//! `JAVA_HOME`) and mirrors every export into `env_setup.sh` so externally
//! triggered subshells can source the same state. Concurrent pipelines with
//! different toolchains would race on those variables; repository sets are
//! expected to share one toolchain.

pub mod package_manager;

mod dotnet;
mod env;
mod java;

use crate::config::ToolchainKind;
use crate::executor::{CommandSpec, ExecError};
use package_manager::PackageManager;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Errors preparing a build environment.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("root privileges required (run with sudo)")]
    RootRequired,

    #[error("no supported package manager found (apt-get, yum, or dnf required)")]
    NoPackageManager,

    #[error("unsupported build type: {0}")]
    UnsupportedBuildType(String),

    #[error("invalid version {version} for {kind}; supported: {supported:?}")]
    UnsupportedVersion {
        version: String,
        kind: ToolchainKind,
        supported: &'static [&'static str],
    },

    #[error("could not locate {tool} installation root at {}", .path.display())]
    ToolRootNotFound { tool: &'static str, path: PathBuf },

    #[error("{tool} not usable after installation: {source}")]
    ToolUnusable {
        tool: &'static str,
        source: ExecError,
    },

    #[error("failed to persist environment: {0}")]
    EnvPersist(#[from] std::io::Error),

    #[error(transparent)]
    Command(#[from] ExecError),

    #[error("provisioning task failed: {0}")]
    Task(String),
}

/// Ensure the toolchain for `build_type`/`version` is installed, on `PATH`,
/// and verified usable.
///
/// Fails immediately without root privileges, on an unknown build type, on a
/// version outside the type-specific whitelist, or when no supported package
/// manager is present.
pub async fn ensure_environment(build_type: &str, version: &str) -> Result<(), ProvisionError> {
    ensure_root().await?;

    let kind = ToolchainKind::parse(build_type)
        .ok_or_else(|| ProvisionError::UnsupportedBuildType(build_type.to_string()))?;
    if !version.is_empty() && !kind.supported_versions().contains(&version) {
        return Err(ProvisionError::UnsupportedVersion {
            version: version.to_string(),
            kind,
            supported: kind.supported_versions(),
        });
    }

    let pm = PackageManager::detect()?;
    info!(
        package_manager = pm.name(),
        toolchain = %kind,
        version,
        "ensuring build environment"
    );

    match kind {
        ToolchainKind::Dotnet => dotnet::ensure(version, pm).await,
        ToolchainKind::Java => java::ensure(version, pm).await,
    }
}

/// Installs need to write system package databases, so an effective uid of 0
/// is a hard precondition.
async fn ensure_root() -> Result<(), ProvisionError> {
    let uid = CommandSpec::new("id").arg("-u").output().await?;
    if uid.trim() == "0" {
        Ok(())
    } else {
        Err(ProvisionError::RootRequired)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
