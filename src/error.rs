//! Unified error types.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// RunnerError
// ---------------------------------------------------------------------------

/// Failures inside one child-process invocation.
///
/// These never escape the runner: `run_invocation` folds them into a failed
/// `InvocationResult` carrying the rendered message.
#[derive(Debug)]
pub enum RunnerError {
    /// The program could not be started (missing, not executable, ...).
    Spawn { program: String, source: std::io::Error },
    /// The invocation deadline elapsed and the child was killed.
    TimedOut(Duration),
    /// The user dismissed a prompt; the child was killed.
    Cancelled,
    /// Reading from or writing to the child failed.
    Io(std::io::Error),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { program, source } => write!(f, "{program}: {source}"),
            Self::TimedOut(_) => write!(f, "timed out"),
            Self::Cancelled => write!(f, "cancelled by user"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for RunnerError {}

impl From<std::io::Error> for RunnerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// LintError
// ---------------------------------------------------------------------------

/// Errors from running the external linter.
///
/// Malformed linter output is not an error; it parses as an empty report.
#[derive(Debug)]
pub enum LintError {
    /// The target file does not exist.
    MissingFile(String),
    /// The linter process could not be run to completion.
    Process(RunnerError),
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile(path) => write!(f, "file not found: {path}"),
            Self::Process(e) => write!(f, "linter: {e}"),
        }
    }
}

impl std::error::Error for LintError {}

impl From<RunnerError> for LintError {
    fn from(e: RunnerError) -> Self {
        Self::Process(e)
    }
}

// ---------------------------------------------------------------------------
// DeployError
// ---------------------------------------------------------------------------

/// Preflight failures that stop a deployment before anything is spawned.
#[derive(Debug)]
pub enum DeployError {
    MissingContract(String),
    NotAFile(String),
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContract(path) => write!(f, "contract not found: {path}"),
            Self::NotAFile(path) => write!(f, "contract path is not a file: {path}"),
        }
    }
}

impl std::error::Error for DeployError {}
