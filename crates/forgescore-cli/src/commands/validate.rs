//! The `forgescore validate` command (also the default with no arguments).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use forgescore_core::config::load_config_from;
use forgescore_core::engine::{ValidationReporter, Validator};
use forgescore_core::report::ScoreReport;
use forgescore_runner::ForgeRunner;

/// Console reporter.
///
/// Prints grading diagnostics to stdout. In quiet mode only warnings go out,
/// on stderr, so stdout carries nothing but the JSON report.
struct ConsoleReporter {
    quiet: bool,
    /// Command line suggested in the closing hint.
    command: String,
}

impl ValidationReporter for ConsoleReporter {
    fn on_staging_failed(&self, file_name: &str, error: &str) {
        if self.quiet {
            eprintln!("Failed to copy file {file_name}\n{error}");
        } else {
            println!("Failed to copy file {file_name}\n{error}");
        }
    }

    fn on_attempt_failed(&self, attempt: u32, max_attempts: u32, error: &str) {
        eprintln!("  Attempt {attempt}/{max_attempts} could not run tests: {error}");
    }

    fn on_count_parsed(&self, name: &str, value: u64) {
        if !self.quiet {
            println!("{name} = {value}");
        }
    }

    fn on_complete(&self, _report: &ScoreReport, project_name: &str) {
        if !self.quiet {
            println!(
                "\nFor more indepth feedback, open a terminal and type 'cd {project_name}'\n\
                 then run the tests by typing '{cmd}' or '{cmd} -vvv'\n",
                cmd = self.command
            );
        }
    }
}

pub async fn execute(
    path: PathBuf,
    config_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json"),
        "unknown format '{format}' (expected text or json)"
    );

    let config = load_config_from(config_path.as_deref())?;
    let submission_root = std::path::absolute(&path)
        .with_context(|| format!("invalid submission path: {}", path.display()))?;

    tracing::info!(
        submission = %submission_root.display(),
        reference_project = %config.reference_project.display(),
        "grading submission"
    );

    let runner = ForgeRunner::from_config(&config);
    let validator = Validator::new(Arc::new(runner), config.validator_config());
    let reporter = ConsoleReporter {
        quiet: format == "json",
        command: config.command_line(),
    };

    let report = validator.validate(&submission_root, &reporter).await?;

    if let Some(out) = &output {
        report.save_json(out)?;
        eprintln!("Report saved to: {}", out.display());
    }

    match format.as_str() {
        "json" => {
            let json =
                serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{json}");
        }
        _ => println!("Score = {}", report.score),
    }

    Ok(())
}
