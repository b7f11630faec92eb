//! Interactive child-process runner.
//!
//! Drives an external CLI to completion while answering the questions it
//! asks on its output streams:
//!
//! - [`process`] spawns children and reads their streams.
//! - [`classify`] decides whether a line of output is a prompt.
//! - [`session`] holds the per-invocation prompt state machine.
//! - [`resolve`] turns a prompt into a reply for the child's stdin.
//! - [`extract`] finds the address token that marks success.
//! - [`interactive`] ties them together in a single consumer loop.

pub mod classify;
pub mod extract;
pub mod interactive;
pub mod process;
pub mod resolve;
pub mod session;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::PromptConfig;

pub use interactive::run_invocation;
pub use resolve::{PresetFirst, PresetResolver, PromptResolver, PromptResponse, SecretRequest};

/// Which standard stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Duration,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Final outcome of one interactive invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// True only when a success token was found in the output.
    pub success: bool,
    /// Everything the child wrote to stdout and stderr, in arrival order.
    pub output: String,
    /// The extracted address, when present.
    pub token: Option<String>,
    /// Human-readable summary.
    pub message: String,
    /// Exit code, when the child exited on its own.
    pub exit_code: Option<i32>,
}

impl InvocationResult {
    pub(crate) fn failure(output: String, message: impl Into<String>) -> Self {
        Self {
            success: false,
            output,
            token: None,
            message: message.into(),
            exit_code: None,
        }
    }
}

/// Receives child output that is not prompt text, plus runner status lines.
pub trait OutputSink: Send + Sync {
    fn output(&self, stream: StreamKind, text: &str);
    fn status(&self, text: &str);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn output(&self, _stream: StreamKind, _text: &str) {}

    fn status(&self, _text: &str) {}
}

/// Prompt handling knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// How long prompt text accumulates before it is answered.
    pub debounce: Duration,
    /// Minimum length for new keystore passwords.
    pub min_password_len: usize,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&PromptConfig::default())
    }
}

impl From<&PromptConfig> for RunnerOptions {
    fn from(config: &PromptConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_password_len: config.min_password_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_builder_collects_arguments() {
        let inv = CommandInvocation::new("genlayer", Duration::from_secs(5))
            .arg("deploy")
            .args(["--contract", "my contract.py"])
            .cwd("/tmp");
        assert_eq!(inv.program(), "genlayer");
        assert_eq!(inv.arguments(), ["deploy", "--contract", "my contract.py"]);
        assert_eq!(inv.working_dir(), Some(Path::new("/tmp")));
        assert_eq!(inv.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let inv = CommandInvocation::new("genlayer", Duration::from_secs(1))
            .args(["deploy", "--contract", "my contract.py"]);
        assert_eq!(
            inv.to_string(),
            "genlayer deploy --contract \"my contract.py\""
        );
    }

    #[test]
    fn options_follow_prompt_config() {
        let options = RunnerOptions::default();
        assert_eq!(options.debounce, Duration::from_millis(100));
        assert_eq!(options.min_password_len, 8);
    }
}
