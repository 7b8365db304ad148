//! Core data model types for forgescore.
//!
//! These describe where a submission lives, where it gets staged inside the
//! reference project, and which summary format a test run produced.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a submission's contract file is expected, and where it gets staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionLayout {
    /// Name of the project subdirectory in a whole-project upload (e.g. "AMM").
    pub project_name: String,
    /// File name of the required contract source (e.g. "AMM.sol").
    pub file_name: String,
}

impl Default for SubmissionLayout {
    fn default() -> Self {
        Self {
            project_name: "AMM".to_string(),
            file_name: "AMM.sol".to_string(),
        }
    }
}

impl SubmissionLayout {
    /// Candidate locations for the contract file, in priority order.
    ///
    /// The file directly under the submission root wins over the one nested
    /// in `<project>/src/`.
    pub fn candidates(&self, root: &Path) -> [PathBuf; 2] {
        [
            root.join(&self.file_name),
            root.join(&self.project_name)
                .join("src")
                .join(&self.file_name),
        ]
    }

    /// Path inside the reference project that the submission overwrites.
    pub fn staged_path(&self, reference_project: &Path) -> PathBuf {
        reference_project.join("src").join(&self.file_name)
    }
}

/// Which summary format a test run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunFormat {
    /// Exit status 0: "N passed; M failed" summary.
    Passing,
    /// Exit status 1: some assertions failed, "N tests succeeded" summary.
    Failing,
    /// Any other status, or killed by a signal. Not scored.
    Unscorable,
}

impl RunFormat {
    /// Classify a tool exit status.
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => RunFormat::Passing,
            Some(1) => RunFormat::Failing,
            _ => RunFormat::Unscorable,
        }
    }
}

impl fmt::Display for RunFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFormat::Passing => write!(f, "passing"),
            RunFormat::Failing => write!(f, "failing"),
            RunFormat::Unscorable => write!(f, "unscorable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_in_priority_order() {
        let layout = SubmissionLayout::default();
        let [first, second] = layout.candidates(Path::new("/repo"));
        assert_eq!(first, PathBuf::from("/repo/AMM.sol"));
        assert_eq!(second, PathBuf::from("/repo/AMM/src/AMM.sol"));
    }

    #[test]
    fn staged_path_is_under_src() {
        let layout = SubmissionLayout {
            project_name: "Vault".into(),
            file_name: "Vault.sol".into(),
        };
        assert_eq!(
            layout.staged_path(Path::new("/tests/Vault")),
            PathBuf::from("/tests/Vault/src/Vault.sol")
        );
    }

    #[test]
    fn exit_code_classification() {
        assert_eq!(RunFormat::from_exit_code(Some(0)), RunFormat::Passing);
        assert_eq!(RunFormat::from_exit_code(Some(1)), RunFormat::Failing);
        assert_eq!(RunFormat::from_exit_code(Some(2)), RunFormat::Unscorable);
        assert_eq!(RunFormat::from_exit_code(Some(-1)), RunFormat::Unscorable);
        assert_eq!(RunFormat::from_exit_code(None), RunFormat::Unscorable);
    }

    #[test]
    fn run_format_serializes_snake_case() {
        let json = serde_json::to_string(&RunFormat::Unscorable).unwrap();
        assert_eq!(json, "\"unscorable\"");
    }
}
