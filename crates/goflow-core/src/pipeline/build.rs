//! Build stage: locate the build descriptor, compile, stage artifacts.

use crate::config::{PipelineConfig, ToolchainKind};
use crate::executor::{CommandSpec, ExecError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from the build stage.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unsupported build type: {0}")]
    UnsupportedType(String),

    #[error("no {kind} build descriptor found in {}", .dir.display())]
    DescriptorNotFound { kind: ToolchainKind, dir: PathBuf },

    #[error(transparent)]
    Command(#[from] ExecError),

    #[error("failed to stage artifacts from {} to {}: {source}", .src.display(), .dst.display())]
    Artifacts {
        src: PathBuf,
        dst: PathBuf,
        source: std::io::Error,
    },
}

/// Compile the checkout in `workspace` and merge the stage output into the
/// configured `build.output_path`.
pub(crate) async fn run(config: &PipelineConfig, workspace: &Path) -> Result<(), BuildError> {
    let kind = ToolchainKind::parse(&config.build.kind)
        .ok_or_else(|| BuildError::UnsupportedType(config.build.kind.clone()))?;
    let descriptor =
        find_build_file(workspace, kind).ok_or_else(|| BuildError::DescriptorNotFound {
            kind,
            dir: workspace.to_path_buf(),
        })?;
    info!(toolchain = %kind, descriptor = %descriptor.display(), "build stage starting");

    let staged = match kind {
        ToolchainKind::Dotnet => {
            let output_dir = workspace.join("build-output");
            CommandSpec::new("dotnet")
                .arg("restore")
                .arg(descriptor.display().to_string())
                .current_dir(workspace)
                .run_with_retry()
                .await?;
            CommandSpec::new("dotnet")
                .arg("publish")
                .arg(descriptor.display().to_string())
                .args(["-c", "Release", "-o"])
                .arg(output_dir.display().to_string())
                .arg("/p:UseAppHost=false")
                .current_dir(workspace)
                .run_with_retry()
                .await?;
            output_dir
        }
        ToolchainKind::Java => {
            CommandSpec::new("mvn")
                .args(["clean", "package", "-f"])
                .arg(descriptor.display().to_string())
                .current_dir(workspace)
                .run_with_retry()
                .await?;
            descriptor
                .parent()
                .unwrap_or(workspace)
                .join("target")
        }
    };

    stage_artifacts(&staged, Path::new(&config.build.output_path))?;
    info!("build stage complete");
    Ok(())
}

/// Locate the build descriptor under `dir`: the first file ending in
/// `.csproj` for .NET, the first file named `pom.xml` for Java. The walk is
/// depth-first in directory order and returns eagerly on the first hit.
pub(crate) fn find_build_file(dir: &Path, kind: ToolchainKind) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && descriptor_matches(&path, kind) {
            return Some(path);
        }
        if path.is_dir() {
            if let Some(found) = find_build_file(&path, kind) {
                return Some(found);
            }
        }
    }
    None
}

fn descriptor_matches(path: &Path, kind: ToolchainKind) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    match kind {
        ToolchainKind::Dotnet => name.ends_with(".csproj"),
        ToolchainKind::Java => name == "pom.xml",
    }
}

/// Merge the immediate children of `source` into `destination`, resolving
/// both to absolute paths first.
pub(crate) fn stage_artifacts(source: &Path, destination: &Path) -> Result<(), BuildError> {
    let artifacts_err = |source_err: std::io::Error| BuildError::Artifacts {
        src: source.to_path_buf(),
        dst: destination.to_path_buf(),
        source: source_err,
    };

    let absolute_src = source.canonicalize().map_err(artifacts_err)?;
    std::fs::create_dir_all(destination).map_err(artifacts_err)?;
    let absolute_dst = destination.canonicalize().map_err(artifacts_err)?;

    copy_dir_contents(&absolute_src, &absolute_dst).map_err(artifacts_err)?;
    info!(
        from = %absolute_src.display(),
        to = %absolute_dst.display(),
        "artifacts staged"
    );
    Ok(())
}

/// Recursively copy everything inside `src` into `dst`, merging with
/// whatever is already there.
pub(crate) fn copy_dir_contents(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&target)?;
            copy_dir_contents(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
