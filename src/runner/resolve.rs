//! Prompt resolution: turning a detected prompt into bytes for the child.
//!
//! Obtaining the answer is delegated to a [`PromptResolver`] (terminal
//! dialogs, preset answers, test scripts). This module owns everything that
//! must not vary between resolvers: labels, password length validation, and
//! the exact reply written to stdin.

use async_trait::async_trait;

use super::classify::{PasswordContext, PromptKind};
use super::session::PendingPrompt;

/// Re-asks allowed after a too-short password before giving up.
const MAX_SECRET_ATTEMPTS: usize = 5;

/// Request for masked text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    /// Short label shown next to the input.
    pub label: String,
    /// Raw prompt line printed by the child.
    pub prompt_text: String,
    pub context: PasswordContext,
    /// Validation message from the previous attempt.
    pub error: Option<String>,
}

/// Source of answers for interactive prompts.
///
/// `None` means the user dismissed the dialog; the runner then kills the
/// child process.
#[async_trait]
pub trait PromptResolver: Send + Sync {
    /// Ask a yes/no question.
    async fn confirm(&self, question: &str) -> Option<bool>;

    /// Ask for a secret without echoing it.
    async fn secret(&self, request: &SecretRequest) -> Option<String>;
}

/// Outcome of resolving one prompt.
#[derive(Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Line to write to the child's stdin, newline included.
    Reply(String),
    Cancelled,
}

// Replies may carry a password; keep them out of debug logs.
impl std::fmt::Debug for PromptResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reply(_) => f.write_str("Reply(<redacted>)"),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Label shown for each password sub-case.
pub fn password_label(context: PasswordContext) -> &'static str {
    match context {
        PasswordContext::NewKeystore => "Create a password to encrypt your keystore",
        PasswordContext::Confirm => "Confirm your keystore password",
        PasswordContext::Decrypt => "Enter your keystore password",
    }
}

/// Validate a secret for the given context.
///
/// Only a brand-new keystore password has a minimum length; confirmations
/// and decrypt attempts are checked by the CLI itself.
pub fn validate_secret(
    secret: &str,
    context: PasswordContext,
    min_len: usize,
) -> Result<(), String> {
    if context == PasswordContext::NewKeystore && secret.chars().count() < min_len {
        return Err(format!("Password must be at least {min_len} characters"));
    }
    Ok(())
}

/// Obtain an answer for `prompt` from `resolver`.
pub async fn resolve_prompt(
    resolver: &dyn PromptResolver,
    prompt: &PendingPrompt,
    min_password_len: usize,
) -> PromptResponse {
    match prompt.kind {
        PromptKind::Keypair => resolve_keypair(resolver, &prompt.text).await,
        PromptKind::Password(context) => {
            resolve_password(resolver, &prompt.text, context, min_password_len).await
        }
    }
}

async fn resolve_keypair(resolver: &dyn PromptResolver, prompt_text: &str) -> PromptResponse {
    let question = format!("No keypair was found ({prompt_text}). Create a new one?");
    match resolver.confirm(&question).await {
        Some(true) => PromptResponse::Reply("Y\n".to_string()),
        Some(false) => PromptResponse::Reply("n\n".to_string()),
        None => PromptResponse::Cancelled,
    }
}

async fn resolve_password(
    resolver: &dyn PromptResolver,
    prompt_text: &str,
    context: PasswordContext,
    min_len: usize,
) -> PromptResponse {
    let mut request = SecretRequest {
        label: password_label(context).to_string(),
        prompt_text: prompt_text.to_string(),
        context,
        error: None,
    };
    for _ in 0..MAX_SECRET_ATTEMPTS {
        let secret = match resolver.secret(&request).await {
            Some(secret) if !secret.is_empty() => secret,
            _ => return PromptResponse::Cancelled,
        };
        match validate_secret(&secret, context, min_len) {
            Ok(()) => return PromptResponse::Reply(format!("{secret}\n")),
            Err(message) => {
                tracing::debug!(%message, "password rejected by local validation");
                request.error = Some(message);
            }
        }
    }
    tracing::warn!("giving up after {MAX_SECRET_ATTEMPTS} invalid password entries");
    PromptResponse::Cancelled
}

/// Non-interactive resolver with fixed answers, for CI and scripts.
#[derive(Clone, Default)]
pub struct PresetResolver {
    /// Answer for "create keypair?"; `None` dismisses the question.
    pub create_keypair: Option<bool>,
    /// Answer for every password prompt; `None` dismisses it.
    pub password: Option<String>,
}

impl std::fmt::Debug for PresetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetResolver")
            .field("create_keypair", &self.create_keypair)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl PromptResolver for PresetResolver {
    async fn confirm(&self, _question: &str) -> Option<bool> {
        self.create_keypair
    }

    async fn secret(&self, _request: &SecretRequest) -> Option<String> {
        self.password.clone()
    }
}

/// Preset answers where configured, `fallback` for everything else.
pub struct PresetFirst<'a> {
    pub presets: PresetResolver,
    pub fallback: &'a dyn PromptResolver,
}

#[async_trait]
impl<'a> PromptResolver for PresetFirst<'a> {
    async fn confirm(&self, question: &str) -> Option<bool> {
        match self.presets.create_keypair {
            Some(answer) => Some(answer),
            None => self.fallback.confirm(question).await,
        }
    }

    async fn secret(&self, request: &SecretRequest) -> Option<String> {
        match &self.presets.password {
            Some(password) => Some(password.clone()),
            None => self.fallback.secret(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Resolver replaying scripted answers and recording what it was asked.
    #[derive(Default)]
    struct Scripted {
        confirms: Mutex<VecDeque<Option<bool>>>,
        secrets: Mutex<VecDeque<Option<String>>>,
        requests: Mutex<Vec<SecretRequest>>,
    }

    impl Scripted {
        fn with_secrets(answers: &[Option<&str>]) -> Self {
            Self {
                secrets: Mutex::new(answers.iter().map(|a| a.map(str::to_string)).collect()),
                ..Self::default()
            }
        }

        fn with_confirm(answer: Option<bool>) -> Self {
            Self {
                confirms: Mutex::new(VecDeque::from([answer])),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl PromptResolver for Scripted {
        async fn confirm(&self, _question: &str) -> Option<bool> {
            self.confirms.lock().unwrap().pop_front().flatten()
        }

        async fn secret(&self, request: &SecretRequest) -> Option<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.secrets.lock().unwrap().pop_front().flatten()
        }
    }

    fn prompt(kind: PromptKind, text: &str) -> PendingPrompt {
        PendingPrompt {
            text: text.to_string(),
            kind,
            handled: true,
        }
    }

    #[tokio::test]
    async fn keypair_yes_no_and_dismissal() {
        let p = prompt(PromptKind::Keypair, "Keypair not found (Y/n)");
        let yes = resolve_prompt(&Scripted::with_confirm(Some(true)), &p, 8).await;
        assert_eq!(yes, PromptResponse::Reply("Y\n".into()));
        let no = resolve_prompt(&Scripted::with_confirm(Some(false)), &p, 8).await;
        assert_eq!(no, PromptResponse::Reply("n\n".into()));
        let dismissed = resolve_prompt(&Scripted::with_confirm(None), &p, 8).await;
        assert_eq!(dismissed, PromptResponse::Cancelled);
    }

    #[tokio::test]
    async fn short_new_keystore_password_is_re_requested() {
        let resolver = Scripted::with_secrets(&[Some("abcdefg"), Some("abcdefgh")]);
        let p = prompt(
            PromptKind::Password(PasswordContext::NewKeystore),
            "Enter password to encrypt keystore:",
        );
        let response = resolve_prompt(&resolver, &p, 8).await;
        assert_eq!(response, PromptResponse::Reply("abcdefgh\n".into()));

        let requests = resolver.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].error, None);
        assert_eq!(
            requests[1].error.as_deref(),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(requests[1].label, password_label(PasswordContext::NewKeystore));
    }

    #[tokio::test]
    async fn confirm_and_decrypt_skip_length_validation() {
        for context in [PasswordContext::Confirm, PasswordContext::Decrypt] {
            let resolver = Scripted::with_secrets(&[Some("abc")]);
            let p = prompt(PromptKind::Password(context), "Enter password:");
            let response = resolve_prompt(&resolver, &p, 8).await;
            assert_eq!(response, PromptResponse::Reply("abc\n".into()));
        }
    }

    #[tokio::test]
    async fn empty_or_cancelled_secret_cancels() {
        let p = prompt(
            PromptKind::Password(PasswordContext::Decrypt),
            "Enter password:",
        );
        let empty = resolve_prompt(&Scripted::with_secrets(&[Some("")]), &p, 8).await;
        assert_eq!(empty, PromptResponse::Cancelled);
        let none = resolve_prompt(&Scripted::with_secrets(&[None]), &p, 8).await;
        assert_eq!(none, PromptResponse::Cancelled);
    }

    #[tokio::test]
    async fn preset_resolver_gives_up_on_a_short_password() {
        let resolver = PresetResolver {
            create_keypair: Some(true),
            password: Some("short".into()),
        };
        let p = prompt(
            PromptKind::Password(PasswordContext::NewKeystore),
            "Create keystore password:",
        );
        assert_eq!(
            resolve_prompt(&resolver, &p, 8).await,
            PromptResponse::Cancelled
        );
    }

    #[tokio::test]
    async fn presets_take_priority_over_the_fallback() {
        let fallback = Scripted {
            confirms: Mutex::new(VecDeque::from([Some(false)])),
            secrets: Mutex::new(VecDeque::from([Some("from-terminal".to_string())])),
            ..Scripted::default()
        };
        let layered = PresetFirst {
            presets: PresetResolver {
                create_keypair: Some(true),
                password: None,
            },
            fallback: &fallback,
        };
        assert_eq!(layered.confirm("create?").await, Some(true));
        let request = SecretRequest {
            label: "label".into(),
            prompt_text: "Enter password:".into(),
            context: PasswordContext::Decrypt,
            error: None,
        };
        assert_eq!(layered.secret(&request).await.as_deref(), Some("from-terminal"));
        assert_eq!(fallback.confirms.lock().unwrap().len(), 1);
    }

    #[test]
    fn debug_output_redacts_replies() {
        let reply = PromptResponse::Reply("hunter22\n".into());
        assert_eq!(format!("{reply:?}"), "Reply(<redacted>)");
    }
}
