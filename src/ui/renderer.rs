//! Terminal output renderer for status lines, lint reports, and child output.

use crossterm::style::Stylize;
use std::io::{self, Write};

use crate::lint::{LintReport, Severity};
use crate::runner::{OutputSink, StreamKind};
use crate::ui::settings;

/// Handles all terminal output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether ANSI color/style output is enabled.
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Print a warning (to stderr).
    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!(
                "{} {msg}",
                settings::LABEL_WARNING.with(settings::COLOR_WARNING).bold()
            );
        } else {
            eprintln!("{} {msg}", settings::LABEL_WARNING);
        }
    }

    /// Print an error (to stderr).
    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!(
                "{} {msg}",
                settings::LABEL_ERROR.with(settings::COLOR_ERROR).bold()
            );
        } else {
            eprintln!("{} {msg}", settings::LABEL_ERROR);
        }
    }

    /// Print a small section header in status-style output.
    pub fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                title.with(settings::COLOR_SECTION_TITLE).bold()
            );
        } else {
            eprintln!("{title}:");
        }
    }

    /// Print an activity line for run lifecycle updates.
    pub fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                text.with(settings::COLOR_ACTIVITY_TEXT).bold()
            );
        } else {
            eprintln!("{text}");
        }
    }

    /// Print a key/value line under a status section.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "{}{} {}",
                settings::INDENT_1,
                format!("{key}:").with(settings::COLOR_FIELD_KEY),
                value.with(settings::COLOR_FIELD_VALUE),
            );
        } else {
            eprintln!("{}{key}: {value}", settings::INDENT_1);
        }
    }

    /// Print the outcome line (to stdout).
    pub fn outcome(&self, success: bool, text: &str) {
        let (glyph, color) = if success {
            (settings::GLYPH_PASS, settings::COLOR_SUCCESS)
        } else {
            (settings::GLYPH_FAIL, settings::COLOR_ERROR)
        };
        if self.color {
            println!("{} {}", glyph.with(color).bold(), text);
        } else {
            println!("{glyph} {text}");
        }
    }

    /// Print a human-readable lint report (to stdout).
    pub fn lint_report(&self, report: &LintReport) {
        let lines = report.human_lines();
        let Some((headline, details)) = lines.split_first() else {
            return;
        };
        if !self.color {
            for line in &lines {
                println!("{line}");
            }
            return;
        }
        let headline_color = if report.passed() {
            settings::COLOR_SUCCESS
        } else {
            settings::COLOR_ERROR
        };
        println!("{}", headline.as_str().with(headline_color).bold());
        for (line, finding) in details.iter().zip(&report.findings) {
            let color = match finding.severity {
                Severity::Error => settings::COLOR_ERROR,
                Severity::Warning => settings::COLOR_WARNING,
                Severity::Info => settings::COLOR_FIELD_VALUE,
            };
            println!("{}", line.as_str().with(color));
        }
    }
}

impl OutputSink for Renderer {
    /// Child output is passed through verbatim; stderr is dimmed.
    fn output(&self, stream: StreamKind, text: &str) {
        match stream {
            StreamKind::Stdout => {
                let mut out = io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            StreamKind::Stderr => {
                let mut err = io::stderr().lock();
                let _ = if self.color {
                    write!(err, "{}", text.with(settings::COLOR_CHILD_STDERR))
                } else {
                    err.write_all(text.as_bytes())
                };
                let _ = err.flush();
            }
        }
    }

    fn status(&self, text: &str) {
        self.activity(text);
    }
}
