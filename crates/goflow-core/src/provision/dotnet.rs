//! .NET SDK provisioning.

use crate::executor::CommandSpec;
use crate::provision::env;
use crate::provision::package_manager::{DistroFamily, PackageManager};
use crate::provision::ProvisionError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DOTNET: &str = "dotnet";
const DOTNET_ROOT: &str = "DOTNET_ROOT";
const MICROSOFT_DEB: &str = "/tmp/packages-microsoft-prod.deb";

/// Ensure the requested .NET SDK is installed, with `DOTNET_ROOT` exported
/// and `<root>/bin` on `PATH`.
///
/// When `dotnet --version` already reports the requested version the install
/// is skipped but the environment is still exported, so a pre-provisioned
/// host behaves identically to a freshly provisioned one.
pub(crate) async fn ensure(version: &str, pm: PackageManager) -> Result<(), ProvisionError> {
    match env::tool_version(DOTNET, "--version").await {
        Ok(current) if current.starts_with(version) => {
            info!(version = %current, ".NET SDK already installed");
            return export_environment(pm).await;
        }
        Ok(current) => {
            warn!(found = %current, requested = version, ".NET SDK version mismatch, installing");
        }
        Err(_) => {
            warn!(".NET SDK not found, installing");
        }
    }

    add_microsoft_repo(pm).await?;
    pm.update().await?;
    pm.install(&format!("dotnet-sdk-{}", version)).await?;

    export_environment(pm).await?;
    env::verify_tool(DOTNET).await
}

async fn export_environment(pm: PackageManager) -> Result<(), ProvisionError> {
    let root = match std::env::var(DOTNET_ROOT) {
        Ok(value) if !value.is_empty() => PathBuf::from(value),
        _ => {
            let root = sdk_root(pm).await?;
            env::set_env_var(DOTNET_ROOT, &root.display().to_string())?;
            root
        }
    };
    env::append_to_path(&root.join("bin"))
}

/// Locate the SDK root: the conventional per-family path, falling back to
/// the directory holding the `dotnet` binary.
async fn sdk_root(pm: PackageManager) -> Result<PathBuf, ProvisionError> {
    let conventional = match pm.family() {
        DistroFamily::Debian => Path::new("/usr/lib/dotnet"),
        DistroFamily::RedHat => Path::new("/usr/lib64/dotnet"),
    };
    if conventional.is_dir() {
        return Ok(conventional.to_path_buf());
    }

    let not_found = || ProvisionError::ToolRootNotFound {
        tool: DOTNET,
        path: conventional.to_path_buf(),
    };
    let output = CommandSpec::new("which")
        .arg(DOTNET)
        .output()
        .await
        .map_err(|_| not_found())?;
    let binary = PathBuf::from(output.trim());
    match binary.parent() {
        Some(dir) if dir.is_dir() => {
            info!(root = %dir.display(), "inferred .NET SDK root from PATH");
            Ok(dir.to_path_buf())
        }
        _ => Err(not_found()),
    }
}

/// Register the Microsoft package repository for the detected distribution,
/// skipping the work when the repo file already exists.
async fn add_microsoft_repo(pm: PackageManager) -> Result<(), ProvisionError> {
    match pm {
        PackageManager::AptGet => {
            if Path::new("/etc/apt/sources.list.d/microsoft-prod.list").exists() {
                return Ok(());
            }
            CommandSpec::new("wget")
                .args([
                    "https://packages.microsoft.com/config/ubuntu/24.04/packages-microsoft-prod.deb",
                    "-O",
                    MICROSOFT_DEB,
                ])
                .output()
                .await?;
            CommandSpec::new("dpkg").args(["-i", MICROSOFT_DEB]).output().await?;
        }
        PackageManager::Yum | PackageManager::Dnf => {
            if Path::new("/etc/yum.repos.d/microsoft-prod.repo").exists() {
                return Ok(());
            }
            let url = match pm {
                PackageManager::Yum => {
                    "https://packages.microsoft.com/config/centos/7/packages-microsoft-prod.rpm"
                }
                _ => "https://packages.microsoft.com/config/centos/8/packages-microsoft-prod.rpm",
            };
            CommandSpec::new("rpm").args(["-Uvh", url]).output().await?;
        }
    }
    Ok(())
}
