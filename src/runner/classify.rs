//! Heuristic classification of CLI output lines into prompt categories.
//!
//! The deploy CLI's prompts are free text, so every rule here is a string
//! heuristic. Each branch has its own unit test; a wording change upstream
//! should fail a test here before it misbehaves at a terminal.

/// Glyph interactive CLIs print in front of an answered question.
pub const SUCCESS_GLYPH: char = '✔';

/// Marker echoed in place of a typed secret.
const MASKED_MARKER: &str = "***";

/// Substrings (case-sensitive) that turn a password-ish line into a question.
const PASSWORD_QUESTION_MARKERS: [&str; 5] = ["?", "Enter", "Invalid", "Attempt", "Confirm"];

const CONFIRM_MARKERS: [&str; 3] = ["confirm", "again", "re-enter"];
const NEW_KEYSTORE_MARKERS: [&str; 3] = ["new", "create", "encrypt"];
const FAILURE_PHRASES: [&str; 5] = [
    "incorrect password",
    "wrong password",
    "authentication failed",
    "could not decrypt",
    "invalid password",
];

/// What a password prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordContext {
    /// Choosing the password for a keystore being created.
    NewKeystore,
    /// Repeating a password that was just entered.
    Confirm,
    /// Unlocking an existing keystore.
    Decrypt,
}

/// Category of an interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// "keypair not found, create one? (Y/n)"
    Keypair,
    Password(PasswordContext),
}

impl PromptKind {
    /// Prompts sharing a category share one "already handled" flag.
    pub fn category(self) -> PromptCategory {
        match self {
            Self::Keypair => PromptCategory::Keypair,
            Self::Password(_) => PromptCategory::Password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptCategory {
    Keypair,
    Password,
}

/// Classification of one line of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Plain,
    Prompt(PromptKind),
    /// A password question was answered successfully; a follow-up
    /// confirmation may be served again.
    PasswordAccepted,
    /// The CLI rejected a password; the next password prompt is a retry.
    /// Carries the retry question when it shares the line with the notice.
    PasswordRejected(Option<PromptKind>),
}

impl LineClass {
    /// Whether the line resets the password "already handled" flag.
    pub fn is_reset_signal(self) -> bool {
        matches!(self, Self::PasswordAccepted | Self::PasswordRejected(_))
    }
}

/// Classify one line. Signals take priority over prompts.
pub fn classify_line(line: &str) -> LineClass {
    let lower = line.to_lowercase();
    if is_password_accepted(line, &lower) {
        return LineClass::PasswordAccepted;
    }
    if is_password_rejected(line, &lower) {
        let retry = is_password_prompt(line, &lower)
            .then(|| PromptKind::Password(retry_context(&lower)));
        return LineClass::PasswordRejected(retry);
    }
    if is_keypair_prompt(line, &lower) {
        return LineClass::Prompt(PromptKind::Keypair);
    }
    if is_password_prompt(line, &lower) {
        return LineClass::Prompt(PromptKind::Password(password_context(&lower)));
    }
    LineClass::Plain
}

fn starts_with_glyph(line: &str) -> bool {
    line.trim_start().starts_with(SUCCESS_GLYPH)
}

fn is_keypair_prompt(line: &str, lower: &str) -> bool {
    lower.contains("keypair")
        && lower.contains("not found")
        && (line.contains("(Y/n)") || line.contains("(y/n)"))
}

fn is_password_prompt(line: &str, lower: &str) -> bool {
    (lower.contains("password") || lower.contains("keystore"))
        && !starts_with_glyph(line)
        && !line.contains(MASKED_MARKER)
        && PASSWORD_QUESTION_MARKERS
            .iter()
            .any(|marker| line.contains(marker))
}

fn password_context(lower: &str) -> PasswordContext {
    if CONFIRM_MARKERS.iter().any(|m| lower.contains(m)) {
        PasswordContext::Confirm
    } else if NEW_KEYSTORE_MARKERS.iter().any(|m| lower.contains(m)) {
        PasswordContext::NewKeystore
    } else {
        PasswordContext::Decrypt
    }
}

/// Context of a question asked on the same line as a rejection. "again"
/// there means "try again", not "repeat the new password".
fn retry_context(lower: &str) -> PasswordContext {
    match password_context(lower) {
        PasswordContext::Confirm if !lower.contains("confirm") && !lower.contains("re-enter") => {
            PasswordContext::Decrypt
        }
        context => context,
    }
}

fn is_password_accepted(line: &str, lower: &str) -> bool {
    line.contains(SUCCESS_GLYPH) && lower.contains("password") && !lower.contains("confirm")
}

fn is_password_rejected(line: &str, lower: &str) -> bool {
    !starts_with_glyph(line) && FAILURE_PHRASES.iter().any(|p| lower.contains(p))
}
