//! Test tool process execution.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::process::Command;

use forgescore_core::traits::ToolRun;

/// Environment variables cleared in the child so submitted code can't read them.
const SCRUBBED_ENV: &[&str] = &[
    "SSH_AUTH_SOCK",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
    "GITHUB_TOKEN",
    "GH_TOKEN",
    "ETHERSCAN_API_KEY",
    "ETH_RPC_URL",
    "PRIVATE_KEY",
    "MNEMONIC",
    "DOCKER_HOST",
    "DOCKER_CONFIG",
    "KUBECONFIG",
    "DATABASE_URL",
    "NPM_TOKEN",
];

/// Build environment variables for the child process.
///
/// Scrubbed variables come first so `extra` can deliberately set one.
pub fn build_env(extra: &[(String, String)]) -> Vec<(String, String)> {
    SCRUBBED_ENV
        .iter()
        .map(|var| (var.to_string(), String::new()))
        .chain(extra.iter().cloned())
        .collect()
}

/// Run `program args...` in `work_dir` and capture its output.
///
/// Any completed run is `Ok`, whatever its exit status. Spawn failures and
/// timeouts are errors; on timeout the child is killed.
pub async fn run_tool(
    program: &str,
    args: &[String],
    work_dir: &Path,
    env: &[(String, String)],
    timeout: Duration,
) -> Result<ToolRun> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, val) in env {
        cmd.env(key, val);
    }

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .with_context(|| format!("'{program}' timed out after {timeout:?}"))?
        .with_context(|| format!("failed to run '{program}' in {}", work_dir.display()))?;

    let duration_ms = start.elapsed().as_millis() as u64;
    tracing::debug!(
        program,
        exit_code = ?output.status.code(),
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        duration_ms,
        "test tool finished"
    );

    Ok(ToolRun {
        exit_code: output.status.code(),
        stdout: output.stdout,
        stderr: output.stderr,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn build_env_scrubs_then_applies_extra() {
        let env = build_env(&[("FOUNDRY_PROFILE".into(), "ci".into())]);
        assert!(env.contains(&("GITHUB_TOKEN".to_string(), String::new())));
        assert_eq!(
            env.last(),
            Some(&("FOUNDRY_PROFILE".to_string(), "ci".to_string()))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_tool(
            "sh",
            &sh("echo building; echo '2 passed; 1 failed'; echo oops >&2; exit 1"),
            dir.path(),
            &[],
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(run.exit_code, Some(1));
        assert_eq!(
            String::from_utf8_lossy(&run.stdout),
            "building\n2 passed; 1 failed\n"
        );
        assert_eq!(String::from_utf8_lossy(&run.stderr), "oops\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let run = run_tool(
            "sh",
            &sh("cat marker.txt"),
            dir.path(),
            &[],
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(run.exit_code, Some(0));
        assert_eq!(run.stdout, b"here");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn passes_environment() {
        let dir = tempfile::tempdir().unwrap();
        let env = build_env(&[("FORGESCORE_PROBE".into(), "42".into())]);

        let run = run_tool(
            "sh",
            &sh("printf '%s|%s' \"$FORGESCORE_PROBE\" \"$GITHUB_TOKEN\""),
            dir.path(),
            &env,
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(run.stdout, b"42|");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_tool(
            "forgescore-definitely-not-installed",
            &["test".to_string()],
            dir.path(),
            &[],
            Duration::from_secs(30),
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to run"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_work_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_tool(
            "sh",
            &sh("exit 0"),
            &dir.path().join("does-not-exist"),
            &[],
            Duration::from_secs(30),
        )
        .await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_tool(
            "sh",
            &sh("sleep 5"),
            dir.path(),
            &[],
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
