//! Linter JSON output parsing and diagnostic conversion.
//!
//! Two output shapes are accepted:
//!
//! - modern: `{ok, passed, warnings: [{code, msg, line, column|col, suggestion}]}`
//! - legacy: `{results: [{rule_id, message, severity, line, column, suggestion}], summary}`
//!
//! Anything else (empty stdout, a crash trace, truncated JSON) is treated as
//! a report without findings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Severity implied by a rule code: `E…` is an error, anything else a warning.
    pub fn from_code(code: &str) -> Self {
        if code.starts_with('E') {
            Self::Error
        } else {
            Self::Warning
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" | "information" | "hint" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Zero-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Zero-based, end-exclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// One linter finding, as reported (1-based line, 1-based column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub suggestion: Option<String>,
}

impl Finding {
    /// Editor range: one character wide at the reported position.
    pub fn range(&self) -> Range {
        let line = self.line.saturating_sub(1);
        let character = self.column.saturating_sub(1);
        Range {
            start: Position { line, character },
            end: Position {
                line,
                character: character + 1,
            },
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            range: self.range(),
            severity: self.severity,
            code: self.code.clone(),
            message: self.message.clone(),
            suggestion: self.suggestion.clone(),
        }
    }
}

/// Serialized form of a finding for `--json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

/// Parsed linter output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub findings: Vec<Finding>,
    /// Number of checks the linter ran, when it reports one.
    pub checks_passed: Option<u32>,
}

impl LintReport {
    /// Keep only error-severity findings.
    pub fn errors_only(&mut self) {
        self.findings.retain(|f| f.severity == Severity::Error);
    }

    /// Drop findings whose rule code is listed.
    pub fn exclude_rules(&mut self, codes: &[String]) {
        if codes.is_empty() {
            return;
        }
        self.findings
            .retain(|f| !codes.iter().any(|code| code == &f.code));
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.findings.len(),
            ..Summary::default()
        };
        for finding in &self.findings {
            match finding.severity {
                Severity::Error => summary.error += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    /// Plain-text report lines, without styling.
    pub fn human_lines(&self) -> Vec<String> {
        if self.passed() {
            let checks = self.checks_passed.unwrap_or(0);
            return vec![format!("✓ Lint passed ({checks} checks)")];
        }
        let mut lines = vec!["✗ Lint failed".to_string()];
        for finding in &self.findings {
            let location = if finding.line > 0 {
                format!("line {}: ", finding.line)
            } else {
                String::new()
            };
            lines.push(format!("  {location}{}", finding.message));
        }
        lines
    }

    /// `--json` output: converted diagnostics plus the summary.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Output {
            diagnostics: Vec<Diagnostic>,
            summary: Summary,
        }
        serde_json::to_string_pretty(&Output {
            diagnostics: self.findings.iter().map(Finding::to_diagnostic).collect(),
            summary: self.summary(),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReport {
    Legacy(LegacyReport),
    Modern(ModernReport),
}

#[derive(Deserialize)]
struct LegacyReport {
    results: Vec<LegacyResult>,
}

#[derive(Deserialize)]
struct LegacyResult {
    #[serde(default)]
    rule_id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
    #[serde(default)]
    suggestion: Option<String>,
}

#[derive(Deserialize)]
struct ModernReport {
    #[serde(default)]
    passed: Option<u32>,
    #[serde(default)]
    warnings: Vec<ModernWarning>,
}

#[derive(Deserialize)]
struct ModernWarning {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    line: u32,
    #[serde(default, alias = "col")]
    column: u32,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Parse linter stdout. Never fails; unusable output yields an empty report.
pub fn parse_report(stdout: &str) -> LintReport {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        tracing::warn!("linter produced no output; assuming no findings");
        return LintReport::default();
    }
    let raw: RawReport = match serde_json::from_str(trimmed) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "unrecognized linter output; assuming no findings");
            return LintReport::default();
        }
    };
    match raw {
        RawReport::Legacy(report) => LintReport {
            findings: report.results.into_iter().map(legacy_finding).collect(),
            checks_passed: None,
        },
        RawReport::Modern(report) => LintReport {
            findings: report.warnings.into_iter().map(modern_finding).collect(),
            checks_passed: report.passed,
        },
    }
}

fn legacy_finding(raw: LegacyResult) -> Finding {
    let severity = raw
        .severity
        .as_deref()
        .and_then(Severity::from_label)
        .unwrap_or_else(|| Severity::from_code(&raw.rule_id));
    Finding {
        code: raw.rule_id,
        message: raw.message,
        severity,
        line: raw.line,
        column: raw.column,
        suggestion: raw.suggestion,
    }
}

fn modern_finding(raw: ModernWarning) -> Finding {
    Finding {
        severity: Severity::from_code(&raw.code),
        code: raw.code,
        message: raw.msg,
        line: raw.line,
        column: raw.column,
        suggestion: raw.suggestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODERN: &str = r#"{
        "ok": false,
        "passed": 12,
        "warnings": [
            {"code": "E010", "msg": "missing __init__", "line": 4, "column": 1},
            {"code": "W003", "msg": "float in storage", "line": 9, "col": 5, "suggestion": "use bigint"}
        ]
    }"#;

    const LEGACY: &str = r#"{
        "results": [
            {"rule_id": "W001", "message": "unused import", "severity": "warning", "line": 1, "column": 0},
            {"rule_id": "X100", "message": "custom", "severity": "info", "line": 3, "column": 2}
        ],
        "summary": {"total": 2, "by_severity": {"error": 0, "warning": 1, "info": 1}}
    }"#;

    #[test]
    fn modern_shape_derives_severity_from_code() {
        let report = parse_report(MODERN);
        assert_eq!(report.checks_passed, Some(12));
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].severity, Severity::Error);
        assert_eq!(report.findings[1].severity, Severity::Warning);
        assert_eq!(report.findings[1].column, 5);
        assert_eq!(report.findings[1].suggestion.as_deref(), Some("use bigint"));
    }

    #[test]
    fn legacy_shape_keeps_reported_severity() {
        let report = parse_report(LEGACY);
        assert_eq!(report.checks_passed, None);
        assert_eq!(report.findings[0].code, "W001");
        assert_eq!(report.findings[0].severity, Severity::Warning);
        assert_eq!(report.findings[1].severity, Severity::Info);
    }

    #[test]
    fn legacy_unknown_severity_falls_back_to_code() {
        let report =
            parse_report(r#"{"results":[{"rule_id":"E2","message":"m","severity":"fatal"}]}"#);
        assert_eq!(report.findings[0].severity, Severity::Error);
    }

    #[test]
    fn malformed_or_empty_output_means_no_findings() {
        for stdout in ["", "   \n", "Traceback (most recent call last):", "[1, 2]", "{\"ok\":"] {
            assert_eq!(parse_report(stdout), LintReport::default(), "{stdout:?}");
        }
    }

    #[test]
    fn range_is_zero_based_and_one_wide() {
        let report = parse_report(MODERN);
        let range = report.findings[1].range();
        assert_eq!(range.start, Position { line: 8, character: 4 });
        assert_eq!(range.end, Position { line: 8, character: 5 });
    }

    #[test]
    fn range_saturates_at_zero() {
        let report = parse_report(LEGACY);
        let range = report.findings[0].range();
        assert_eq!(range.start, Position { line: 0, character: 0 });
        assert_eq!(range.end.character, 1);
    }

    #[test]
    fn filters_and_summary() {
        let mut report = parse_report(MODERN);
        assert_eq!(
            report.summary(),
            Summary { total: 2, error: 1, warning: 1, info: 0 }
        );
        report.exclude_rules(&["E010".to_string()]);
        assert!(!report.has_errors());
        assert_eq!(report.findings.len(), 1);

        let mut report = parse_report(MODERN);
        report.errors_only();
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].code, "E010");
    }

    #[test]
    fn human_lines_for_pass_and_fail() {
        let passed = parse_report(r#"{"ok": true, "passed": 7, "warnings": []}"#);
        assert_eq!(passed.human_lines(), ["✓ Lint passed (7 checks)"]);

        let failed = parse_report(MODERN);
        assert_eq!(
            failed.human_lines(),
            [
                "✗ Lint failed",
                "  line 4: missing __init__",
                "  line 9: float in storage"
            ]
        );
    }

    #[test]
    fn json_output_carries_ranges_and_summary() {
        let json = parse_report(MODERN).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["diagnostics"][1]["range"]["start"]["character"], 4);
        assert_eq!(value["diagnostics"][1]["suggestion"], "use bigint");
        assert!(value["diagnostics"][0].get("suggestion").is_none());
    }
}
