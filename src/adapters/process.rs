//! Shared subprocess execution for CLI-backed adapters.
//!
//! Every external tool is spawned the same way: stdout/stderr captured,
//! the wait bounded by the stage timeout, and a non-zero exit mapped to a
//! structured error carrying the tool name and trimmed stderr.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use super::ToolError;

/// Captured output of a completed tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    /// Raw stdout (lossy UTF-8)
    pub stdout: String,
}

/// Spawn `command`, wait for it to finish within `limit`, and map the
/// exit status to a result.
pub(crate) async fn run_tool(
    tool: &'static str,
    command: &mut Command,
    limit: Duration,
) -> Result<ToolOutput, ToolError> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn { tool, source })?;

    let output = timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| ToolError::Timeout {
            tool,
            seconds: limit.as_secs(),
        })?
        .map_err(|source| ToolError::Spawn { tool, source })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::NonZeroExit {
            tool,
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_invocation_captures_stdout() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");

        let output = run_tool("echo", &mut cmd, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_maps_to_structured_error() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo oops >&2; exit 3"]);

        let err = run_tool("sh", &mut cmd, Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            ToolError::NonZeroExit { tool, code, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(code, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_maps_to_spawn_error() {
        let mut cmd = Command::new("definitely-not-a-real-binary-shiprun");

        let err = run_tool("missing", &mut cmd, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { tool: "missing", .. }));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");

        let err = run_tool("sleep", &mut cmd, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { tool: "sleep", .. }));
    }
}
