//! Score reports with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RunFormat;
use crate::parser::SummaryCounts;

/// Percentage of tests passed, in `[0, 100]`. Zero when nothing was counted.
pub fn compute_score(passed: u64, failed: u64) -> f64 {
    let total = passed as f64 + failed as f64;
    if total > 0.0 {
        100.0 * passed as f64 / total
    } else {
        0.0
    }
}

/// The outcome of grading one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The contract file that was graded.
    pub submission: PathBuf,
    /// Which summary format the run produced.
    pub format: RunFormat,
    /// Exit status of the test tool (`None` if killed by a signal).
    pub exit_code: Option<i32>,
    /// How many times the tool was launched.
    pub attempts: u32,
    /// Last line of tool output with escapes stripped.
    pub summary_line: String,
    pub passed: u64,
    pub failed: u64,
    /// Percentage score in `[0, 100]`.
    pub score: f64,
}

impl ScoreReport {
    /// Build a report from the counts parsed out of a scorable run.
    pub fn scored(
        submission: PathBuf,
        format: RunFormat,
        exit_code: Option<i32>,
        attempts: u32,
        summary_line: String,
        counts: SummaryCounts,
    ) -> Self {
        let (passed, failed) = counts.totals();
        Self {
            created_at: Utc::now(),
            submission,
            format,
            exit_code,
            attempts,
            summary_line,
            passed,
            failed,
            score: compute_score(passed, failed),
        }
    }

    /// Build the zero-score report for a run whose exit status can't be graded.
    pub fn unscorable(submission: PathBuf, exit_code: Option<i32>, attempts: u32) -> Self {
        Self {
            created_at: Utc::now(),
            submission,
            format: RunFormat::Unscorable,
            exit_code,
            attempts,
            summary_line: String::new(),
            passed: 0,
            failed: 0,
            score: 0.0,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory {}", parent.display())
                })?;
            }
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_counts_score_zero() {
        assert_eq!(compute_score(0, 0), 0.0);
    }

    #[test]
    fn score_is_ratio_of_passed() {
        assert!(approx_eq(compute_score(2, 1), 200.0 / 3.0));
        assert!(approx_eq(compute_score(3, 2), 60.0));
        assert!(approx_eq(compute_score(5, 0), 100.0));
        assert!(approx_eq(compute_score(0, 7), 0.0));
    }

    #[test]
    fn score_stays_in_range() {
        for passed in 0..20u64 {
            for failed in 0..20u64 {
                let score = compute_score(passed, failed);
                assert!((0.0..=100.0).contains(&score), "{passed}/{failed} -> {score}");
            }
        }
    }

    #[test]
    fn scored_report_treats_misses_as_zero() {
        let report = ScoreReport::scored(
            PathBuf::from("AMM.sol"),
            RunFormat::Failing,
            Some(1),
            1,
            "3 tests succeeded".into(),
            SummaryCounts {
                passed: Some(3),
                failed: None,
            },
        );
        assert_eq!(report.passed, 3);
        assert_eq!(report.failed, 0);
        assert!(approx_eq(report.score, 100.0));
    }

    #[test]
    fn unscorable_report_is_zero() {
        let report = ScoreReport::unscorable(PathBuf::from("AMM.sol"), Some(2), 1);
        assert_eq!(report.format, RunFormat::Unscorable);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("score.json");
        let report = ScoreReport::scored(
            PathBuf::from("/repo/AMM.sol"),
            RunFormat::Passing,
            Some(0),
            2,
            "2 passed, 1 failed".into(),
            SummaryCounts {
                passed: Some(2),
                failed: Some(1),
            },
        );

        report.save_json(&path).unwrap();
        let loaded = ScoreReport::load_json(&path).unwrap();
        assert_eq!(loaded.passed, 2);
        assert_eq!(loaded.failed, 1);
        assert_eq!(loaded.attempts, 2);
        assert_eq!(loaded.format, RunFormat::Passing);
        assert!(approx_eq(loaded.score, report.score));
    }
}
