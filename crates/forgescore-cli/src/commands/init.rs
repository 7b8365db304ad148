//! The `forgescore init` command.

use anyhow::Result;

use forgescore_core::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Point reference_project at the test project");
    println!("  2. Run: forgescore validate --path <submission>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# forgescore configuration

# Contract file the student submits, and the project folder it may sit in
# (<submission>/AMM.sol or <submission>/AMM/src/AMM.sol).
submission_file = "AMM.sol"
project_name = "AMM"

# Reference project with the test contracts. The submission is copied to
# <reference_project>/src/<submission_file> before every run.
reference_project = ".guides/tests/AMM"

# Test tool, e.g. "${HOME}/.foundry/bin/forge"
forge_bin = "forge"
test_args = ["test"]

# Extra attempts when the tool cannot be launched at all
max_retries = 3
retry_delay_ms = 0

# Kill a test run that takes longer than this
timeout_secs = 300

[env]
# FOUNDRY_PROFILE = "default"
"#;
