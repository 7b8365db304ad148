//! The validator: discovery, staging, invocation with retry, parsing, scoring.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ValidationError;
use crate::model::{RunFormat, SubmissionLayout};
use crate::parser::{parse_failing_format, parse_passing_format, summary_line};
use crate::report::ScoreReport;
use crate::submission::{discover_submission, stage_submission};
use crate::traits::{TestTool, ToolRun};

/// Upper bound on the delay between launch retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Where the submission's file lives and its name.
    pub layout: SubmissionLayout,
    /// Reference project root; the tool runs here.
    pub reference_project: PathBuf,
    /// Extra attempts when the tool cannot be launched.
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each subsequent retry.
    pub retry_delay: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            layout: SubmissionLayout::default(),
            reference_project: PathBuf::from(".guides/tests/AMM"),
            max_retries: 3,
            retry_delay: Duration::ZERO,
        }
    }
}

/// Receives the human-facing diagnostics of a validation run.
pub trait ValidationReporter: Send + Sync {
    fn on_staging_failed(&self, file_name: &str, error: &str);
    fn on_attempt_failed(&self, attempt: u32, max_attempts: u32, error: &str);
    /// A count was found in the summary line (`name` is "num_passed" or "num_failed").
    fn on_count_parsed(&self, name: &str, value: u64);
    fn on_complete(&self, report: &ScoreReport, project_name: &str);
}

/// No-op reporter.
pub struct NoopReporter;

impl ValidationReporter for NoopReporter {
    fn on_staging_failed(&self, _: &str, _: &str) {}
    fn on_attempt_failed(&self, _: u32, _: u32, _: &str) {}
    fn on_count_parsed(&self, _: &str, _: u64) {}
    fn on_complete(&self, _: &ScoreReport, _: &str) {}
}

/// Grades one submission at a time against the reference project.
pub struct Validator {
    tool: Arc<dyn TestTool>,
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(tool: Arc<dyn TestTool>, config: ValidatorConfig) -> Self {
        Self { tool, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Grade the submission found under `submission_root`.
    ///
    /// Each attempt rediscovers and restages the submission before launching
    /// the tool. Only launch failures are retried; a run that completes with
    /// any exit status is final.
    pub async fn validate(
        &self,
        submission_root: &Path,
        reporter: &dyn ValidationReporter,
    ) -> Result<ScoreReport, ValidationError> {
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut retry_delay = self.config.retry_delay;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 && !retry_delay.is_zero() {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }

            let submission = discover_submission(submission_root, &self.config.layout)?;
            self.stage(&submission, reporter);

            tracing::info!(
                attempt,
                max_attempts,
                tool = self.tool.name(),
                project = %self.config.reference_project.display(),
                "running test tool"
            );

            match self.tool.run_tests(&self.config.reference_project).await {
                Ok(run) => return Ok(self.score_run(submission, run, attempt, reporter)),
                Err(e) => {
                    let message = format!("{e:#}");
                    tracing::warn!(attempt, max_attempts, "test tool failed to run: {message}");
                    reporter.on_attempt_failed(attempt, max_attempts, &message);
                    last_error = Some(message);
                }
            }
        }

        Err(ValidationError::RetryExhausted {
            command: self.tool.name().to_string(),
            attempts: max_attempts,
            last_error: last_error.unwrap_or_else(|| "unknown error".to_string()),
        })
    }

    /// Copy the submission into the reference project.
    ///
    /// Failure is reported but not fatal: grading continues against whatever
    /// file a previous run left behind.
    fn stage(&self, submission: &Path, reporter: &dyn ValidationReporter) {
        let destination = self
            .config
            .layout
            .staged_path(&self.config.reference_project);
        match stage_submission(submission, &destination) {
            Ok(bytes) => tracing::debug!(
                from = %submission.display(),
                to = %destination.display(),
                bytes,
                "staged submission"
            ),
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!("staging failed, continuing: {message}");
                reporter.on_staging_failed(&self.config.layout.file_name, &message);
            }
        }
    }

    fn score_run(
        &self,
        submission: PathBuf,
        run: ToolRun,
        attempts: u32,
        reporter: &dyn ValidationReporter,
    ) -> ScoreReport {
        if !run.stderr.is_empty() {
            tracing::debug!(stderr = %String::from_utf8_lossy(&run.stderr), "test tool stderr");
        }

        let format = RunFormat::from_exit_code(run.exit_code);
        if format == RunFormat::Unscorable {
            tracing::warn!(exit_code = ?run.exit_code, "test tool exited abnormally, scoring 0");
            return ScoreReport::unscorable(submission, run.exit_code, attempts);
        }

        let line = summary_line(&run.stdout);
        tracing::debug!(%format, summary = %line, "parsing summary line");

        let counts = match format {
            RunFormat::Failing => parse_failing_format(&line),
            _ => parse_passing_format(&line),
        };
        if let Some(n) = counts.passed {
            reporter.on_count_parsed("num_passed", n);
        }
        if let Some(n) = counts.failed {
            reporter.on_count_parsed("num_failed", n);
        }

        let report =
            ScoreReport::scored(submission, format, run.exit_code, attempts, line, counts);
        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            score = report.score,
            duration_ms = run.duration_ms,
            "submission graded"
        );
        reporter.on_complete(&report, &self.config.layout.project_name);
        report
    }
}
