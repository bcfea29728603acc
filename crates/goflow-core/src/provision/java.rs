//! JDK and Maven provisioning.
//!
//! The two installs are independent, so they run as parallel tasks with a
//! join barrier. Both always run to completion; the first error (JDK first)
//! is the one reported.

use crate::provision::env;
use crate::provision::package_manager::{DistroFamily, PackageManager};
use crate::provision::ProvisionError;
use std::path::PathBuf;
use tokio::task::JoinError;
use tracing::{info, warn};

const JAVA: &str = "java";
const MVN: &str = "mvn";
const JAVA_HOME: &str = "JAVA_HOME";

/// Ensure the requested JDK and Maven are installed, then verify `mvn`.
pub(crate) async fn ensure(version: &str, pm: PackageManager) -> Result<(), ProvisionError> {
    let jdk = tokio::spawn(ensure_jdk(version.to_string(), pm));
    let maven = tokio::spawn(ensure_maven(pm));

    let (jdk_result, maven_result) = tokio::join!(jdk, maven);
    flatten(jdk_result)?;
    flatten(maven_result)?;

    env::verify_tool(MVN).await
}

fn flatten(result: Result<Result<(), ProvisionError>, JoinError>) -> Result<(), ProvisionError> {
    result.map_err(|err| ProvisionError::Task(err.to_string()))?
}

async fn ensure_jdk(version: String, pm: PackageManager) -> Result<(), ProvisionError> {
    // `java -version` prints to stderr; combined capture covers it.
    match env::tool_version(JAVA, "-version").await {
        Ok(current) if current.contains(&version) => {
            info!(version = %current.lines().next().unwrap_or_default(), "JDK already installed");
            return Ok(());
        }
        Ok(current) => {
            warn!(found = %current.lines().next().unwrap_or_default(), requested = %version, "JDK version mismatch, installing");
        }
        Err(_) => {
            warn!("Java not found, installing");
        }
    }

    pm.update().await?;
    pm.install(&jdk_package(pm, &version)).await?;

    let home = java_home(pm, &version)?;
    env::set_env_var(JAVA_HOME, &home.display().to_string())?;
    env::append_to_path(&home.join("bin"))
}

async fn ensure_maven(pm: PackageManager) -> Result<(), ProvisionError> {
    if env::tool_version(MVN, "--version").await.is_ok() {
        info!("Maven already installed");
        return Ok(());
    }
    warn!("Maven not found, installing");
    pm.install("maven").await?;
    Ok(())
}

/// Distribution-specific OpenJDK package name.
pub(crate) fn jdk_package(pm: PackageManager, version: &str) -> String {
    match pm.family() {
        DistroFamily::Debian => format!("openjdk-{}-jdk", version),
        DistroFamily::RedHat => format!("java-{}-openjdk-devel", version),
    }
}

/// Conventional install root for the given JDK version; must exist after the
/// package install.
fn java_home(pm: PackageManager, version: &str) -> Result<PathBuf, ProvisionError> {
    let home = match pm.family() {
        DistroFamily::Debian => PathBuf::from(format!("/usr/lib/jvm/java-{}-openjdk-amd64", version)),
        DistroFamily::RedHat => PathBuf::from(format!("/usr/lib/jvm/java-{}-openjdk", version)),
    };
    if home.is_dir() {
        Ok(home)
    } else {
        Err(ProvisionError::ToolRootNotFound {
            tool: JAVA,
            path: home,
        })
    }
}

#[cfg(test)]
#[path = "java_tests.rs"]
mod tests;
