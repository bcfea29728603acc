//! # GoFlow CLI
//!
//! Command-line entry point: flag parsing, logging setup, configuration
//! resolution, and server startup.
//!
//! The configuration file is selected by `--config` (default
//! `config.json`), which the `GOFLOW_CONFIG` environment variable replaces
//! before path resolution starts.

use clap::Parser;
use goflow_core::config::{self, ConfigError, CONFIG_ENV_VAR};
use goflow_core::status::StatusRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

// ============================================================================
// CLI structure
// ============================================================================

/// GoFlow, a self-hosted CI service driven by forge webhooks.
#[derive(Debug, Parser)]
#[command(name = "goflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Self-hosted CI pipelines triggered by GitHub and GitLab webhooks")]
pub struct Cli {
    /// Pipeline configuration file (JSON or YAML)
    #[arg(short, long, default_value = "config.json")]
    pub config: String,

    /// Address the HTTP server binds to
    #[arg(short, long, default_value = "0.0.0.0:9099")]
    pub listen: String,

    /// Logging level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Emit JSON-structured logs
    #[arg(long)]
    pub json_logs: bool,
}

/// Errors the binary exits with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments, load configuration, and run the service until killed.
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);
    run(cli).await
}

/// Run with already-parsed arguments. Split from [`run_cli`] so tests can
/// drive it without touching the process arguments or global logger.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let requested = std::env::var(CONFIG_ENV_VAR).unwrap_or(cli.config);
    let path = config::resolve_config_path(&requested)
        .ok_or(ConfigError::NotFound { requested })?;
    let pipeline_config = Arc::new(config::load(&path)?);
    info!(
        repositories = pipeline_config.repositories.len(),
        build_type = %pipeline_config.build.kind,
        "configuration loaded"
    );

    let registry = Arc::new(StatusRegistry::new());
    let server = goflow_service::create_server(&cli.listen, pipeline_config, registry);
    server.run().await?;
    Ok(())
}

fn init_tracing(level: &str, json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
