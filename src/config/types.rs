//! Configuration data model.
//!
//! Struct/enum definitions plus default values. Source discovery and env
//! overrides live in sibling modules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_DEPLOY_PROGRAM, DEFAULT_DEPLOY_TIMEOUT_SECS,
    DEFAULT_LINTER_PROGRAM, DEFAULT_LINT_TIMEOUT_SECS, DEFAULT_MIN_PASSWORD_LEN,
};

/// Command-line shape spoken by the external linter.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinterMode {
    /// `<program> lint <file> --json`
    #[default]
    Modern,
    /// `<program> <file> --format json`
    Legacy,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub linter: LinterConfig,
    pub deploy: DeployConfig,
    pub prompts: PromptConfig,
    pub display: DisplayConfig,
}

/// External linter invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinterConfig {
    pub program: String,
    /// Arguments placed before the subcommand (e.g. `["-m", "genvm_linter.cli"]`).
    pub args: Vec<String>,
    pub mode: LinterMode,
    pub timeout_secs: u64,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_LINTER_PROGRAM.into(),
            args: Vec::new(),
            mode: LinterMode::Modern,
            timeout_secs: DEFAULT_LINT_TIMEOUT_SECS,
        }
    }
}

impl LinterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External deploy CLI invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Optional RPC endpoint passed as `--rpc <url>`.
    pub rpc: Option<String>,
    /// Working directory; defaults to the contract's directory.
    pub cwd: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_DEPLOY_PROGRAM.into(),
            args: Vec::new(),
            rpc: None,
            cwd: None,
            timeout_secs: DEFAULT_DEPLOY_TIMEOUT_SECS,
        }
    }
}

impl DeployConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Interactive prompt handling knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub debounce_ms: u64,
    pub min_password_len: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl PromptConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Terminal output preferences.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Outcome of `genvm-assist init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInitResult {
    Created { path: PathBuf },
    AlreadyInitialized { path: PathBuf },
    Overwritten { path: PathBuf, backup_path: PathBuf },
}
