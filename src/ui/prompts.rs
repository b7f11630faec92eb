//! Terminal dialogs answering the deploy CLI's questions.
//!
//! Reads block, so each dialog runs on tokio's blocking pool while the
//! runner keeps draining child output.

use async_trait::async_trait;
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

use crate::runner::{PromptResolver, SecretRequest};
use crate::ui::settings;

/// Parse a yes/no answer. Empty input takes the default (yes).
pub fn parse_yes_no(input: &str) -> Option<bool> {
    let normalized = input.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Resolver asking the user on the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalResolver {
    color: bool,
}

impl TerminalResolver {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

#[async_trait]
impl PromptResolver for TerminalResolver {
    async fn confirm(&self, question: &str) -> Option<bool> {
        let color = self.color;
        let question = question.to_string();
        match tokio::task::spawn_blocking(move || ask_yes_no(&question, color)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "reading confirmation failed");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation task failed");
                None
            }
        }
    }

    async fn secret(&self, request: &SecretRequest) -> Option<String> {
        let color = self.color;
        let request = request.clone();
        match tokio::task::spawn_blocking(move || ask_secret(&request, color)).await {
            Ok(Ok(secret)) => Some(secret),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "password entry aborted");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "password task failed");
                None
            }
        }
    }
}

/// Ask until the answer parses. EOF dismisses the question.
fn ask_yes_no(question: &str, color: bool) -> io::Result<Option<bool>> {
    let stdin = io::stdin();
    loop {
        let mut stderr = io::stderr().lock();
        if color {
            write!(
                stderr,
                "{} {}{}",
                settings::GLYPH_PROMPT.with(settings::COLOR_PROMPT_GLYPH).bold(),
                question.with(settings::COLOR_PROMPT_TEXT),
                settings::CONFIRM_SUFFIX
            )?;
        } else {
            write!(stderr, "{} {question}{}", settings::GLYPH_PROMPT, settings::CONFIRM_SUFFIX)?;
        }
        stderr.flush()?;
        drop(stderr);

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            eprintln!();
            return Ok(None);
        }
        if let Some(answer) = parse_yes_no(&line) {
            return Ok(Some(answer));
        }
    }
}

fn ask_secret(request: &SecretRequest, color: bool) -> io::Result<String> {
    if let Some(error) = &request.error {
        if color {
            eprintln!("{}{}", settings::INDENT_1, error.as_str().with(settings::COLOR_ERROR));
        } else {
            eprintln!("{}{error}", settings::INDENT_1);
        }
    }
    if color {
        eprintln!(
            "{}{}",
            settings::INDENT_1,
            request.prompt_text.as_str().with(settings::COLOR_PROMPT_CONTEXT)
        );
    } else {
        eprintln!("{}{}", settings::INDENT_1, request.prompt_text);
    }
    let label = if color {
        format!(
            "{} {}{}",
            settings::GLYPH_PROMPT.with(settings::COLOR_PROMPT_GLYPH).bold(),
            request.label.as_str().with(settings::COLOR_PROMPT_TEXT),
            settings::SECRET_SUFFIX
        )
    } else {
        format!("{} {}{}", settings::GLYPH_PROMPT, request.label, settings::SECRET_SUFFIX)
    };
    rpassword::prompt_password(label)
}
