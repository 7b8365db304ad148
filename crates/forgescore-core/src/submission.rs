//! Submission discovery and staging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::ValidationError;
use crate::model::SubmissionLayout;

/// Locate the contract file under `root`.
///
/// The root-level file wins over the nested `<project>/src/` one.
pub fn discover_submission(
    root: &Path,
    layout: &SubmissionLayout,
) -> Result<PathBuf, ValidationError> {
    let [root_candidate, nested_candidate] = layout.candidates(root);
    if root_candidate.is_file() {
        return Ok(root_candidate);
    }
    if nested_candidate.is_file() {
        return Ok(nested_candidate);
    }
    Err(ValidationError::MissingSubmission {
        file_name: layout.file_name.clone(),
        root_candidate,
        nested_candidate,
    })
}

/// Overwrite `destination` with the bytes of `source`.
///
/// The destination directory must already exist; it is not created.
///
/// The validator treats a failure here as non-fatal, so the next test run
/// grades whatever file was staged before, if any.
pub fn stage_submission(source: &Path, destination: &Path) -> Result<u64> {
    let bytes = std::fs::read(source)
        .with_context(|| format!("failed to read submission {}", source.display()))?;
    std::fs::write(destination, &bytes)
        .with_context(|| format!("failed to write {}", destination.display()))?;
    Ok(bytes.len() as u64)
}
