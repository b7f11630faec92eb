//! External linter invocation.

pub mod report;

use std::path::Path;

use crate::config::{LinterConfig, LinterMode};
use crate::error::LintError;
use crate::runner::process::run_captured;
use crate::runner::CommandInvocation;

pub use report::{parse_report, Diagnostic, Finding, LintReport, Severity, Summary};

/// Finding filters applied after parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintFilter {
    pub errors_only: bool,
    pub exclude_rules: Vec<String>,
}

impl LintFilter {
    pub fn apply(&self, report: &mut LintReport) {
        if self.errors_only {
            report.errors_only();
        }
        report.exclude_rules(&self.exclude_rules);
    }
}

/// Build the linter command line for `file`.
pub fn lint_invocation(config: &LinterConfig, file: &Path) -> CommandInvocation {
    let file = file.to_string_lossy().into_owned();
    let invocation = CommandInvocation::new(config.program.as_str(), config.timeout())
        .args(config.args.iter().cloned());
    match config.mode {
        LinterMode::Modern => invocation.arg("lint").arg(file).arg("--json"),
        LinterMode::Legacy => invocation.arg(file).args(["--format", "json"]),
    }
}

/// Lint `file` with the configured external linter.
///
/// A non-zero linter exit code is expected when findings exist and is not an
/// error; only a missing file or a failure to run the linter at all is.
pub async fn run_linter(config: &LinterConfig, file: &Path) -> Result<LintReport, LintError> {
    if !file.is_file() {
        return Err(LintError::MissingFile(file.display().to_string()));
    }
    let invocation = lint_invocation(config, file);
    tracing::debug!(command = %invocation, "running linter");
    let output = run_captured(&invocation).await?;
    if !output.stderr.trim().is_empty() {
        tracing::debug!(stderr = %output.stderr.trim(), "linter stderr");
    }
    let report = parse_report(&output.stdout);
    tracing::debug!(
        exit_code = output.exit_code,
        findings = report.findings.len(),
        "linter finished"
    );
    Ok(report)
}
