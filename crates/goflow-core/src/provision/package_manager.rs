//! System package managers the provisioner can drive.
//!
//! The variants share the same surface (refresh the package index, install
//! a package) with per-variant command tables. Detection probes `PATH` for
//! the well-known binaries in a fixed order and the first hit wins.

use crate::executor::{CommandSpec, ExecError};
use crate::provision::ProvisionError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;

/// Broad distribution family, used to pick package names and install roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    Debian,
    RedHat,
}

/// A detected system package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    AptGet,
    Yum,
    Dnf,
}

impl PackageManager {
    /// Probe order; the first binary found on `PATH` decides.
    pub const PROBE_ORDER: [Self; 3] = [Self::AptGet, Self::Yum, Self::Dnf];

    /// Detect the package manager for this host.
    pub fn detect() -> Result<Self, ProvisionError> {
        for pm in Self::PROBE_ORDER {
            if let Some(path) = look_path(pm.name()) {
                info!(path = %path.display(), "package manager detected");
                return Ok(pm);
            }
        }
        Err(ProvisionError::NoPackageManager)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AptGet => "apt-get",
            Self::Yum => "yum",
            Self::Dnf => "dnf",
        }
    }

    pub fn family(self) -> DistroFamily {
        match self {
            Self::AptGet => DistroFamily::Debian,
            Self::Yum | Self::Dnf => DistroFamily::RedHat,
        }
    }

    /// Refresh the package index.
    pub async fn update(self) -> Result<(), ExecError> {
        let spec = match self {
            Self::AptGet => CommandSpec::new("apt-get").arg("update"),
            Self::Yum => CommandSpec::new("yum").arg("makecache"),
            Self::Dnf => CommandSpec::new("dnf").arg("makecache"),
        };
        spec.run_with_retry().await.map(|_| ())
    }

    /// Install a package non-interactively.
    pub async fn install(self, package: &str) -> Result<(), ExecError> {
        CommandSpec::new(self.name())
            .args(["install", "-y", package])
            .run_with_retry()
            .await
            .map(|_| ())
    }
}

/// Find `command` on the current `PATH`.
pub(crate) fn look_path(command: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    look_path_in(&path_var, command)
}

fn look_path_in(path_var: &OsStr, command: &str) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "package_manager_tests.rs"]
mod tests;
