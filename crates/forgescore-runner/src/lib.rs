//! forgescore-runner — Subprocess-backed test execution.
//!
//! Implements the `TestTool` trait by spawning `forge test` (or any
//! configured command) in the reference project, bounded by a timeout.

pub mod process;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use forgescore_core::config::GraderConfig;
use forgescore_core::traits::{TestTool, ToolRun};

/// Test tool that runs an external command.
pub struct ForgeRunner {
    /// Executable to launch.
    program: String,
    /// Arguments passed to the executable.
    args: Vec<String>,
    /// Upper bound on a single run.
    timeout: Duration,
    /// Extra environment for the child.
    env: Vec<(String, String)>,
    /// Display form of the command line.
    display: String,
}

impl ForgeRunner {
    /// Runner for `<program> test` with the default timeout.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let mut runner = Self {
            display: String::new(),
            program,
            args: vec!["test".to_string()],
            timeout: Duration::from_secs(300),
            env: Vec::new(),
        };
        runner.refresh_display();
        runner
    }

    /// Build a runner from the grader config.
    pub fn from_config(config: &GraderConfig) -> Self {
        let mut runner = Self::new(config.forge_bin.clone())
            .with_args(config.test_args.clone())
            .with_timeout(config.timeout())
            .with_env(config.env.clone().into_iter().collect());
        runner.display = config.command_line();
        runner
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self.refresh_display();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn refresh_display(&mut self) {
        self.display = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
    }
}

#[async_trait]
impl TestTool for ForgeRunner {
    fn name(&self) -> &str {
        &self.display
    }

    async fn run_tests(&self, project_root: &Path) -> Result<ToolRun> {
        let env = process::build_env(&self.env);
        process::run_tool(&self.program, &self.args, project_root, &env, self.timeout).await
    }
}
