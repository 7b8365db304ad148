//! Parsers for the forge test summary line.
//!
//! Only the last line of the tool's stdout is inspected. It is stripped of
//! terminal color codes and then matched against one of two formats,
//! depending on whether the run had failing assertions.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[([0-9,A-Z]{1,2}(;[0-9]{1,2})?(;[0-9]{3})?)?[m|K]?")
        .expect("ANSI escape pattern is valid")
});

static PASSING_PASSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) passed").expect("passed pattern is valid"));

static PASSING_FAILED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) failed").expect("failed pattern is valid"));

static FAILING_SUCCEEDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) tests succeeded").expect("succeeded pattern is valid")
});

// Word characters, not digits: "no failing tests" matches too and is
// treated as a miss once the capture fails to parse as a number.
static FAILING_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+) failing tests").expect("failing pattern is valid")
});

/// Counts extracted from a summary line.
///
/// `None` means the pattern did not match; it counts as zero when scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub passed: Option<u64>,
    pub failed: Option<u64>,
}

impl SummaryCounts {
    /// Counts with misses treated as zero.
    pub fn totals(&self) -> (u64, u64) {
        (self.passed.unwrap_or(0), self.failed.unwrap_or(0))
    }
}

/// Remove ANSI color/erase escape sequences.
pub fn strip_ansi_codes(s: &str) -> String {
    ANSI_ESCAPE.replace_all(s, "").into_owned()
}

/// Decode raw tool output and return its last line with escapes stripped.
///
/// Invalid UTF-8 is replaced rather than rejected. Empty output yields an
/// empty line.
pub fn summary_line(output: &[u8]) -> String {
    let text = String::from_utf8_lossy(output);
    strip_ansi_codes(last_line(&text))
}

/// Parse the summary printed when every assertion held (exit status 0).
pub fn parse_passing_format(line: &str) -> SummaryCounts {
    SummaryCounts {
        passed: capture_count(&PASSING_PASSED, line),
        failed: capture_count(&PASSING_FAILED, line),
    }
}

/// Parse the summary printed when some assertions failed (exit status 1).
pub fn parse_failing_format(line: &str) -> SummaryCounts {
    SummaryCounts {
        passed: capture_count(&FAILING_SUCCEEDED, line),
        failed: capture_count(&FAILING_FAILED, line),
    }
}

fn capture_count(pattern: &Regex, line: &str) -> Option<u64> {
    let captured = pattern.captures(line)?.get(1)?.as_str();
    match captured.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(
                pattern = pattern.as_str(),
                captured,
                "summary count is not a number, treating as absent"
            );
            None
        }
    }
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Last line of `text`. A single trailing terminator does not start a new line.
fn last_line(text: &str) -> &str {
    let body = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix(is_line_boundary))
        .unwrap_or(text);
    body.rsplit(is_line_boundary).next().unwrap_or("")
}
