//! Pipeline configuration: schema, file resolution, loading, validation.
//!
//! The configuration is loaded once at startup and treated as read-only for
//! the lifetime of the process. Files are JSON or YAML, dispatched on the
//! file extension. Validation is strict: a config that loads is a config the
//! pipeline can run against, including the guarantee that every configured
//! output directory exists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable that overrides the `--config` flag value before path
/// resolution starts.
pub const CONFIG_ENV_VAR: &str = "GOFLOW_CONFIG";

// ============================================================================
// Schema
// ============================================================================

/// A Git repository this service accepts webhooks for.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RepositoryConfig {
    /// Clone URL, as it appears in the forge payload.
    #[serde(default)]
    pub url: String,

    /// Branch that triggers the pipeline. Pushes to other branches are
    /// acknowledged and ignored.
    #[serde(default)]
    pub branch: String,

    /// Shared secret used to authenticate webhooks for this repository.
    #[serde(default)]
    pub secret: String,
}

/// Build stage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildConfig {
    /// Toolchain kind: `dotnet` or `java`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Directory build artifacts are staged into. Created if absent.
    #[serde(default)]
    pub output_path: String,

    /// Requested toolchain version, e.g. `8.0` or `17`. Empty means
    /// "whatever is installed".
    #[serde(default)]
    pub version: String,
}

/// Test stage settings. Same shape as [`BuildConfig`]; an empty `type`
/// disables the stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TestConfig {
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Directory test reports are copied into. Empty means
    /// `<build.output_path>/test-reports`.
    #[serde(default)]
    pub output_path: String,

    #[serde(default)]
    pub version: String,
}

/// Deploy stage settings. An empty `method` disables the stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeployConfig {
    /// Deployment method: empty, `ssh`, or `docker`.
    #[serde(default)]
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker: Option<DockerConfig>,

    /// Local script run (with `bash`, in the workspace) when a deploy step
    /// fails. Empty selects the default remote cleanup rollback.
    #[serde(default)]
    pub rollback_script: String,

    /// Commands run over SSH on the remote host after a successful sync,
    /// in order. The first failure aborts the rest.
    #[serde(default)]
    pub post_deploy_cmds: Vec<String>,
}

/// SSH deployment target.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SshConfig {
    #[serde(default)]
    pub remote_user: String,

    #[serde(default)]
    pub remote_host: String,

    #[serde(default)]
    pub remote_path: String,

    /// Private key passed to `ssh -i`.
    #[serde(default)]
    pub key_path: String,

    /// Extra options appended to the rsync invocation, space-separated.
    #[serde(default)]
    pub rsync_options: String,
}

/// Docker deployment target. Declared and validated, but the deploy stage
/// does not implement this method yet.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerConfig {
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub registry: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub compose_file: String,
}

/// The full pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub test: TestConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

// ============================================================================
// Toolchain kinds
// ============================================================================

/// The toolchains the build and test stages know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainKind {
    Dotnet,
    Java,
}

impl ToolchainKind {
    /// Parse a configuration `type` string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dotnet" => Some(Self::Dotnet),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dotnet => "dotnet",
            Self::Java => "java",
        }
    }

    /// Versions the provisioner is able to install for this toolchain.
    pub fn supported_versions(self) -> &'static [&'static str] {
        match self {
            Self::Dotnet => &["6.0", "7.0", "8.0", "9.0"],
            Self::Java => &["11", "17", "21"],
        }
    }
}

impl fmt::Display for ToolchainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration file found for '{requested}'")]
    NotFound { requested: String },

    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported config format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Schema violations detected after a configuration file parsed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("at least one repository required")]
    NoRepositories,

    #[error("repository {index}: url, branch, and secret required")]
    IncompleteRepository { index: usize },

    #[error("build: type and output_path required")]
    MissingBuildSettings,

    #[error("unsupported build type: {0}")]
    UnsupportedBuildType(String),

    #[error("invalid version {version} for {kind}; supported: {supported:?}")]
    UnsupportedVersion {
        version: String,
        kind: ToolchainKind,
        supported: &'static [&'static str],
    },

    #[error("unsupported test type: {0}")]
    UnsupportedTestType(String),

    #[error("ssh deployment requires remote_user, remote_host, and remote_path")]
    IncompleteSshConfig,

    #[error("docker deployment requires image")]
    MissingDockerImage,

    #[error("unsupported deploy method: {0}")]
    UnsupportedDeployMethod(String),

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ============================================================================
// Resolution and loading
// ============================================================================

/// Resolve a requested configuration path to an existing file.
///
/// Search order: the path as given, then next to the executable, then the
/// executable's `internal/config/` directory, then `$HOME/.goflow/`. The
/// first existing file wins; `None` when nothing matched.
pub fn resolve_config_path(requested: &str) -> Option<PathBuf> {
    let as_given = PathBuf::from(requested);
    if as_given.is_file() {
        return Some(as_given);
    }
    if as_given.is_absolute() {
        return None;
    }

    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            candidates.push(exe_dir.join(requested));
            candidates.push(exe_dir.join("internal").join("config").join(requested));
        }
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".goflow").join(requested));
    }

    candidates.into_iter().find(|path| path.is_file())
}

/// Load and validate the configuration at `path`.
///
/// The format is dispatched on the file extension: `.json`, `.yaml`, or
/// `.yml`. Anything else is an error.
pub fn load(path: &Path) -> Result<PipelineConfig, ConfigError> {
    info!(path = %path.display(), "loading configuration");

    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path.extension().and_then(|ext| ext.to_str());
    let config: PipelineConfig = match extension {
        Some("json") => serde_json::from_str(&data).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?,
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&data).map_err(|err| ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
        }
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Validate a parsed configuration and create any missing output
/// directories.
pub fn validate(config: &PipelineConfig) -> Result<(), ValidationError> {
    if config.repositories.is_empty() {
        return Err(ValidationError::NoRepositories);
    }
    for (index, repo) in config.repositories.iter().enumerate() {
        if repo.url.is_empty() || repo.branch.is_empty() || repo.secret.is_empty() {
            return Err(ValidationError::IncompleteRepository { index });
        }
    }

    if config.build.kind.is_empty() || config.build.output_path.is_empty() {
        return Err(ValidationError::MissingBuildSettings);
    }
    let build_kind = ToolchainKind::parse(&config.build.kind)
        .ok_or_else(|| ValidationError::UnsupportedBuildType(config.build.kind.clone()))?;
    if !config.build.version.is_empty()
        && !build_kind
            .supported_versions()
            .contains(&config.build.version.as_str())
    {
        return Err(ValidationError::UnsupportedVersion {
            version: config.build.version.clone(),
            kind: build_kind,
            supported: build_kind.supported_versions(),
        });
    }

    if !config.test.kind.is_empty() && ToolchainKind::parse(&config.test.kind).is_none() {
        return Err(ValidationError::UnsupportedTestType(config.test.kind.clone()));
    }

    match config.deploy.method.as_str() {
        "" => {}
        "ssh" => {
            let ssh = config
                .deploy
                .ssh
                .as_ref()
                .ok_or(ValidationError::IncompleteSshConfig)?;
            if ssh.remote_user.is_empty()
                || ssh.remote_host.is_empty()
                || ssh.remote_path.is_empty()
            {
                return Err(ValidationError::IncompleteSshConfig);
            }
        }
        "docker" => {
            let docker = config
                .deploy
                .docker
                .as_ref()
                .ok_or(ValidationError::MissingDockerImage)?;
            if docker.image.is_empty() {
                return Err(ValidationError::MissingDockerImage);
            }
        }
        other => {
            return Err(ValidationError::UnsupportedDeployMethod(other.to_string()));
        }
    }

    ensure_output_dir(&config.build.output_path)?;
    if !config.test.output_path.is_empty() {
        ensure_output_dir(&config.test.output_path)?;
    }

    Ok(())
}

fn ensure_output_dir(path: &str) -> Result<(), ValidationError> {
    std::fs::create_dir_all(path).map_err(|source| ValidationError::OutputDir {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
