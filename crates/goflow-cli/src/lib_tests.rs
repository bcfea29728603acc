//! Tests for CLI argument handling and startup failure modes.

use super::*;
use clap::Parser;

mod parse_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["goflow"]);
        assert_eq!(cli.config, "config.json");
        assert_eq!(cli.listen, "0.0.0.0:9099");
        assert_eq!(cli.log_level, "info");
        assert!(!cli.json_logs);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "goflow",
            "--config",
            "pipelines.yaml",
            "--listen",
            "127.0.0.1:8080",
            "--json-logs",
        ]);
        assert_eq!(cli.config, "pipelines.yaml");
        assert_eq!(cli.listen, "127.0.0.1:8080");
        assert!(cli.json_logs);
    }
}

mod run_tests {
    use super::*;

    /// A config path that resolves nowhere is a configuration error, which
    /// the binary maps to a nonzero exit.
    #[tokio::test]
    async fn test_missing_config_fails_startup() {
        let cli = Cli::parse_from([
            "goflow",
            "--config",
            "/nonexistent/goflow/config.json",
        ]);
        let result = run(cli).await;
        assert!(matches!(result, Err(CliError::Configuration(_))));
    }

    /// An invalid configuration (no repositories) is fatal at startup.
    #[tokio::test]
    async fn test_invalid_config_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"repositories": []}"#).unwrap();

        let cli = Cli::parse_from(["goflow", "--config", path.to_str().unwrap()]);
        let result = run(cli).await;
        match result {
            Err(CliError::Configuration(err)) => {
                assert!(err.to_string().contains("at least one repository required"));
            }
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
