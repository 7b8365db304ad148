//! Grader configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::ValidatorConfig;
use crate::model::SubmissionLayout;

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILE_NAME: &str = "forgescore.toml";

/// Top-level forgescore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Project subdirectory name in a whole-project upload.
    #[serde(default = "default_project_name")]
    pub project_name: String,
    /// Contract file the student must submit.
    #[serde(default = "default_submission_file")]
    pub submission_file: String,
    /// Reference project that holds the test contracts.
    #[serde(default = "default_reference_project")]
    pub reference_project: PathBuf,
    /// Test tool executable.
    #[serde(default = "default_forge_bin")]
    pub forge_bin: String,
    /// Arguments passed to the test tool.
    #[serde(default = "default_test_args")]
    pub test_args: Vec<String>,
    /// Extra attempts when the tool cannot be launched.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds; doubles on each retry.
    #[serde(default)]
    pub retry_delay_ms: u64,
    /// Upper bound on a single test run.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra environment for the test tool (e.g. `FOUNDRY_PROFILE`).
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_project_name() -> String {
    "AMM".to_string()
}
fn default_submission_file() -> String {
    "AMM.sol".to_string()
}
fn default_reference_project() -> PathBuf {
    PathBuf::from(".guides/tests/AMM")
}
fn default_forge_bin() -> String {
    "forge".to_string()
}
fn default_test_args() -> Vec<String> {
    vec!["test".to_string()]
}
fn default_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    300
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            submission_file: default_submission_file(),
            reference_project: default_reference_project(),
            forge_bin: default_forge_bin(),
            test_args: default_test_args(),
            max_retries: default_retries(),
            retry_delay_ms: 0,
            timeout_secs: default_timeout_secs(),
            env: BTreeMap::new(),
        }
    }
}

impl GraderConfig {
    /// Reject values that would make every run fail in a confusing way.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.submission_file.trim().is_empty(),
            "submission_file must not be empty"
        );
        anyhow::ensure!(
            !self.project_name.trim().is_empty(),
            "project_name must not be empty"
        );
        anyhow::ensure!(!self.forge_bin.trim().is_empty(), "forge_bin must not be empty");
        anyhow::ensure!(!self.test_args.is_empty(), "test_args must not be empty");
        anyhow::ensure!(self.timeout_secs >= 1, "timeout_secs must be at least 1");
        Ok(())
    }

    pub fn layout(&self) -> SubmissionLayout {
        SubmissionLayout {
            project_name: self.project_name.clone(),
            file_name: self.submission_file.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for the [`crate::engine::Validator`].
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            layout: self.layout(),
            reference_project: self.reference_project.clone(),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Command line shown in hints and errors (e.g. "forge test").
    pub fn command_line(&self) -> String {
        let program = Path::new(&self.forge_bin)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.forge_bin.clone());
        std::iter::once(program)
            .chain(self.test_args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from `./forgescore.toml`, falling back to defaults.
pub fn load_config() -> Result<GraderConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or `./forgescore.toml`, or defaults.
///
/// A relative `reference_project` read from a file is resolved against that
/// file's directory.
pub fn load_config_from(path: Option<&Path>) -> Result<GraderConfig> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GraderConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GraderConfig::default(),
    };

    // Apply env var overrides
    if let Ok(bin) = std::env::var("FORGESCORE_FORGE_BIN") {
        config.forge_bin = bin;
    }
    if let Ok(project) = std::env::var("FORGESCORE_REFERENCE_PROJECT") {
        config.reference_project = PathBuf::from(project);
    }

    config.forge_bin = resolve_env_vars(&config.forge_bin);
    config.project_name = resolve_env_vars(&config.project_name);
    config.submission_file = resolve_env_vars(&config.submission_file);
    config.test_args = config.test_args.iter().map(|a| resolve_env_vars(a)).collect();
    config.reference_project = resolve_path(&config.reference_project);
    for value in config.env.values_mut() {
        *value = resolve_env_vars(value);
    }

    if config.reference_project.is_relative() {
        if let Some(dir) = config_path.as_deref().and_then(Path::parent) {
            if !dir.as_os_str().is_empty() {
                config.reference_project = dir.join(&config.reference_project);
            }
        }
    }

    config.validate()?;
    tracing::debug!(?config, "loaded grader config");
    Ok(config)
}
