//! Tests for the subprocess executor.

use super::*;

// ============================================================================
// Single-shot execution
// ============================================================================

mod output_tests {
    use super::*;

    /// Stdout is captured on success.
    #[tokio::test]
    async fn test_captures_stdout() {
        let output = CommandSpec::new("sh")
            .args(["-c", "echo hello"])
            .output()
            .await
            .unwrap();
        assert_eq!(output.trim(), "hello");
    }

    /// Stderr is folded into the combined output.
    #[tokio::test]
    async fn test_captures_stderr() {
        let output = CommandSpec::new("sh")
            .args(["-c", "echo oops 1>&2"])
            .output()
            .await
            .unwrap();
        assert_eq!(output.trim(), "oops");
    }

    /// A non-zero exit carries the exit code and captured output.
    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let err = CommandSpec::new("sh")
            .args(["-c", "echo broken; exit 3"])
            .output()
            .await
            .unwrap_err();
        match err {
            ExecError::NonZeroExit { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert!(output.contains("broken"));
            }
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    /// A missing binary is a spawn error, not an exit-status error.
    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = CommandSpec::new("goflow-no-such-binary")
            .output()
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    /// The working directory is honored.
    #[tokio::test]
    async fn test_current_dir_honored() {
        let dir = tempfile::tempdir().unwrap();
        let output = CommandSpec::new("pwd")
            .current_dir(dir.path())
            .output()
            .await
            .unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(output.trim()).canonicalize().unwrap(), expected);
    }

    /// Extra environment variables reach the child.
    #[tokio::test]
    async fn test_env_passed_to_child() {
        let output = CommandSpec::new("sh")
            .args(["-c", "echo $GOFLOW_TEST_MARKER"])
            .env("GOFLOW_TEST_MARKER", "present")
            .output()
            .await
            .unwrap();
        assert_eq!(output.trim(), "present");
    }
}

// ============================================================================
// Retry loop
// ============================================================================

mod retry_tests {
    use super::*;

    /// A deterministically failing command is attempted exactly
    /// `MAX_RETRIES` times. The script appends a line per invocation so the
    /// attempts can be counted from outside the process.
    #[tokio::test]
    async fn test_failing_command_attempted_exactly_three_times() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");

        let script = format!("echo attempt >> {}; exit 1", counter.display());
        let result = CommandSpec::new("sh")
            .args(["-c", script.as_str()])
            .run_with_retry()
            .await;

        assert!(result.is_err());
        let attempts = std::fs::read_to_string(&counter).unwrap().lines().count();
        assert_eq!(attempts, MAX_RETRIES as usize);
    }

    /// A command that starts succeeding mid-way stops retrying. The script
    /// fails until the counter file holds two lines, so the third attempt
    /// succeeds.
    #[tokio::test]
    async fn test_retry_stops_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");

        let script = format!(
            "echo attempt >> {c}; [ $(wc -l < {c}) -ge 3 ]",
            c = counter.display()
        );
        let result = CommandSpec::new("sh")
            .args(["-c", script.as_str()])
            .run_with_retry()
            .await;

        assert!(result.is_ok(), "third attempt should succeed: {:?}", result);
        let attempts = std::fs::read_to_string(&counter).unwrap().lines().count();
        assert_eq!(attempts, 3);
    }

    /// A command that succeeds immediately runs once.
    #[tokio::test]
    async fn test_success_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("attempts");

        let script = format!("echo attempt >> {}", counter.display());
        CommandSpec::new("sh")
            .args(["-c", script.as_str()])
            .run_with_retry()
            .await
            .unwrap();

        let attempts = std::fs::read_to_string(&counter).unwrap().lines().count();
        assert_eq!(attempts, 1);
    }
}

// ============================================================================
// Description
// ============================================================================

mod describe_tests {
    use super::*;

    #[test]
    fn test_describe_joins_program_and_args() {
        let spec = CommandSpec::new("git").args(["clone", "--depth", "1"]);
        assert_eq!(spec.describe(), "git clone --depth 1");
    }
}
