//! The test tool seam.
//!
//! `forgescore-runner` implements [`TestTool`] by spawning `forge test`;
//! [`crate::mock::MockTool`] implements it for tests.

use std::path::Path;

use async_trait::async_trait;

/// Raw result of one test tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolRun {
    /// Exit status (`None` if the process was killed by a signal).
    pub exit_code: Option<i32>,
    /// Captured standard output. This is the only surface that gets parsed.
    pub stdout: Vec<u8>,
    /// Captured standard error, kept for logging.
    pub stderr: Vec<u8>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// An external tool that runs a project's test suite.
#[async_trait]
pub trait TestTool: Send + Sync {
    /// Human-readable command line (e.g. "forge test").
    fn name(&self) -> &str;

    /// Run the test suite with `project_root` as the working directory.
    ///
    /// A returned `ToolRun` means the tool ran to completion, whatever its
    /// exit status. An `Err` means it could not be run at all (missing
    /// binary, I/O failure, timeout) and the attempt may be retried.
    async fn run_tests(&self, project_root: &Path) -> anyhow::Result<ToolRun>;
}
