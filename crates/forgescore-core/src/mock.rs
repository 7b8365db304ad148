//! Mock test tool for exercising the validator without a real toolchain.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{TestTool, ToolRun};

/// One scripted response of a [`MockTool`].
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// The tool ran and exited with `code`, printing `stdout`.
    Exit { code: Option<i32>, stdout: String },
    /// The tool could not be launched.
    LaunchError(String),
}

impl MockOutcome {
    pub fn exit(code: i32, stdout: &str) -> Self {
        MockOutcome::Exit {
            code: Some(code),
            stdout: stdout.to_string(),
        }
    }

    pub fn launch_error(message: &str) -> Self {
        MockOutcome::LaunchError(message.to_string())
    }
}

/// A [`TestTool`] that replays scripted outcomes in order.
///
/// Once the script is exhausted, the fallback outcome repeats.
pub struct MockTool {
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: MockOutcome,
    call_count: AtomicU32,
    /// File whose contents are captured on every call.
    observed_file: Option<PathBuf>,
    observations: Mutex<Vec<Option<Vec<u8>>>>,
    last_project_root: Mutex<Option<PathBuf>>,
}

impl MockTool {
    /// Create a mock that plays `script`, then repeats `fallback`.
    pub fn new(script: Vec<MockOutcome>, fallback: MockOutcome) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            call_count: AtomicU32::new(0),
            observed_file: None,
            observations: Mutex::new(Vec::new()),
            last_project_root: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same outcome.
    pub fn with_fixed_outcome(outcome: MockOutcome) -> Self {
        Self::new(Vec::new(), outcome)
    }

    /// Record the contents of `path` each time the tool is invoked.
    pub fn observing(mut self, path: impl Into<PathBuf>) -> Self {
        self.observed_file = Some(path.into());
        self
    }

    /// Number of times the tool was invoked.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Contents of the observed file at each invocation (`None` if unreadable).
    pub fn observations(&self) -> Vec<Option<Vec<u8>>> {
        self.observations.lock().unwrap().clone()
    }

    /// Working directory passed on the most recent invocation.
    pub fn last_project_root(&self) -> Option<PathBuf> {
        self.last_project_root.lock().unwrap().clone()
    }
}

#[async_trait]
impl TestTool for MockTool {
    fn name(&self) -> &str {
        "mock test"
    }

    async fn run_tests(&self, project_root: &Path) -> anyhow::Result<ToolRun> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_project_root.lock().unwrap() = Some(project_root.to_path_buf());

        if let Some(path) = &self.observed_file {
            let contents = std::fs::read(path).ok();
            self.observations.lock().unwrap().push(contents);
        }

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            MockOutcome::Exit { code, stdout } => Ok(ToolRun {
                exit_code: code,
                stdout: stdout.into_bytes(),
                stderr: Vec::new(),
                duration_ms: 1,
            }),
            MockOutcome::LaunchError(message) => Err(anyhow::anyhow!(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_fallback() {
        let tool = MockTool::new(
            vec![MockOutcome::launch_error("boom")],
            MockOutcome::exit(0, "1 passed"),
        );

        assert!(tool.run_tests(Path::new("/p")).await.is_err());
        let run = tool.run_tests(Path::new("/p")).await.unwrap();
        assert_eq!(run.exit_code, Some(0));
        assert_eq!(run.stdout, b"1 passed");
        let run = tool.run_tests(Path::new("/q")).await.unwrap();
        assert_eq!(run.exit_code, Some(0));

        assert_eq!(tool.call_count(), 3);
        assert_eq!(tool.last_project_root(), Some(PathBuf::from("/q")));
    }

    #[tokio::test]
    async fn records_observed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AMM.sol");
        std::fs::write(&path, "v1").unwrap();

        let tool =
            MockTool::with_fixed_outcome(MockOutcome::exit(0, "")).observing(path.clone());
        tool.run_tests(dir.path()).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        tool.run_tests(dir.path()).await.unwrap();

        assert_eq!(tool.observations(), vec![Some(b"v1".to_vec()), None]);
    }
}
