//! Validation error types.
//!
//! Only the two conditions that make a submission ungradable are errors.
//! Everything else (copy failures, odd exit codes, missing summary counts)
//! degrades toward a possibly-zero score instead.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcomes of a validation run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The contract file exists at neither candidate location.
    #[error(
        "unable to locate your '{file_name}' file in your repo root directory ({}) or\n{}",
        root_candidate.display(),
        nested_candidate.display()
    )]
    MissingSubmission {
        file_name: String,
        root_candidate: PathBuf,
        nested_candidate: PathBuf,
    },

    /// The test tool could not be run on any attempt.
    #[error("could not run '{command}' after {attempts} attempts: {last_error}")]
    RetryExhausted {
        command: String,
        attempts: u32,
        last_error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_submission_names_file_and_both_locations() {
        let err = ValidationError::MissingSubmission {
            file_name: "AMM.sol".into(),
            root_candidate: PathBuf::from("/repo/AMM.sol"),
            nested_candidate: PathBuf::from("/repo/AMM/src/AMM.sol"),
        };
        let msg = err.to_string();
        assert!(msg.contains("'AMM.sol'"));
        assert!(msg.contains("/repo/AMM.sol"));
        assert!(msg.contains("/repo/AMM/src/AMM.sol"));
    }

    #[test]
    fn retry_exhausted_message() {
        let err = ValidationError::RetryExhausted {
            command: "forge test".into(),
            attempts: 4,
            last_error: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not run 'forge test' after 4 attempts: No such file or directory"
        );
    }
}
