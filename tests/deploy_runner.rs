//! End-to-end runner scenarios against fake deploy CLIs.
//!
//! Each fake CLI is a small `sh -c` script that prints prompts the way the
//! real deploy CLI does and echoes back what it read on stdin.

#![cfg(unix)]

use async_trait::async_trait;
use genvm_assist::runner::{
    run_invocation, CommandInvocation, NullSink, OutputSink, PromptResolver, RunnerOptions,
    SecretRequest, StreamKind,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

const ADDR: &str = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0";

/// Replays scripted answers and records every request it sees.
#[derive(Default)]
struct ScriptedResolver {
    confirms: Mutex<VecDeque<Option<bool>>>,
    secrets: Mutex<VecDeque<Option<String>>>,
    questions: Mutex<Vec<String>>,
    secret_requests: Mutex<Vec<SecretRequest>>,
}

impl ScriptedResolver {
    fn confirming(answer: bool) -> Self {
        Self {
            confirms: Mutex::new(VecDeque::from([Some(answer)])),
            ..Self::default()
        }
    }

    fn with_secrets(secrets: &[&str]) -> Self {
        Self {
            secrets: Mutex::new(secrets.iter().map(|s| Some(s.to_string())).collect()),
            ..Self::default()
        }
    }

    fn confirm_count(&self) -> usize {
        self.questions.lock().unwrap().len()
    }

    fn secret_requests(&self) -> Vec<SecretRequest> {
        self.secret_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptResolver for ScriptedResolver {
    async fn confirm(&self, question: &str) -> Option<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        self.confirms.lock().unwrap().pop_front().flatten()
    }

    async fn secret(&self, request: &SecretRequest) -> Option<String> {
        self.secret_requests.lock().unwrap().push(request.clone());
        self.secrets.lock().unwrap().pop_front().flatten()
    }
}

/// Sink capturing forwarded output per stream.
#[derive(Default)]
struct CapturingSink {
    stdout: Mutex<String>,
    stderr: Mutex<String>,
}

impl OutputSink for CapturingSink {
    fn output(&self, stream: StreamKind, text: &str) {
        let target = match stream {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        };
        target.lock().unwrap().push_str(text);
    }

    fn status(&self, _text: &str) {}
}

fn fake_cli(script: &str) -> CommandInvocation {
    CommandInvocation::new("sh", Duration::from_secs(10)).args(["-c", script])
}

fn options() -> RunnerOptions {
    RunnerOptions {
        debounce: Duration::from_millis(50),
        min_password_len: 8,
    }
}

#[tokio::test]
async fn keypair_prompt_writes_uppercase_yes() {
    let script = r#"printf '? Keypair not found. Create a new one? (Y/n) '
read answer
echo "answer:$answer""#;
    let resolver = ScriptedResolver::confirming(true);
    let sink = CapturingSink::default();
    let result = run_invocation(&fake_cli(script), &resolver, &sink, options()).await;

    assert_eq!(resolver.confirm_count(), 1);
    assert!(result.output.contains("answer:Y\n"), "{}", result.output);
    assert!(!result.success);
    assert_eq!(result.exit_code, Some(0));
}

#[tokio::test]
async fn keypair_prompt_writes_lowercase_no() {
    let script = r#"printf 'keypair not found (y/n) '
read answer
echo "answer:$answer""#;
    let resolver = ScriptedResolver::confirming(false);
    let result = run_invocation(&fake_cli(script), &resolver, &NullSink, options()).await;
    assert!(result.output.contains("answer:n\n"), "{}", result.output);
}

#[tokio::test]
async fn short_keystore_password_is_re_requested_before_writing() {
    let script = format!(
        r#"printf 'Enter password to encrypt keystore: '
read pw
echo "got:$pw"
echo "Deployed at {ADDR}""#
    );
    let resolver = ScriptedResolver::with_secrets(&["abcdefg", "abcdefgh"]);
    let result = run_invocation(&fake_cli(&script), &resolver, &NullSink, options()).await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.token.as_deref(), Some(ADDR));
    assert!(result.output.contains("got:abcdefgh\n"));
    assert!(!result.output.contains("got:abcdefg\n"));

    let requests = resolver.secret_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].error.as_deref(),
        Some("Password must be at least 8 characters")
    );
}

#[tokio::test]
async fn repeated_prompt_text_resolves_once() {
    let script = format!(
        r#"for i in 1 2 3 4 5; do printf 'Enter password: \n'; done
read pw
echo "got:$pw"
echo "{ADDR}""#
    );
    let resolver = ScriptedResolver::with_secrets(&["hunter22", "unexpected"]);
    let result = run_invocation(&fake_cli(&script), &resolver, &NullSink, options()).await;

    assert!(result.success, "{result:?}");
    assert_eq!(resolver.secret_requests().len(), 1);
    assert!(result.output.contains("got:hunter22\n"));
}

#[tokio::test]
async fn confirmation_after_success_glyph_is_served() {
    let script = format!(
        r#"printf '? Enter a password to encrypt your keystore: '
read first
printf '✔ password set\n? Confirm password: '
read second
if [ "$first" = "$second" ]; then echo "Deployed {ADDR}"; else echo mismatch; fi"#
    );
    let resolver = ScriptedResolver::with_secrets(&["correct-horse", "correct-horse"]);
    let result = run_invocation(&fake_cli(&script), &resolver, &NullSink, options()).await;

    assert!(result.success, "{result:?}");
    let requests = resolver.secret_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].label, "Confirm your keystore password");
}

#[tokio::test]
async fn rejected_password_allows_a_retry() {
    let script = format!(
        r#"printf 'Enter password: '
read first
echo '✖ Incorrect password'
printf 'Enter password: '
read second
[ "$second" = right ] && echo "{ADDR}""#
    );
    let resolver = ScriptedResolver::with_secrets(&["wrong", "right"]);
    let result = run_invocation(&fake_cli(&script), &resolver, &NullSink, options()).await;

    assert!(result.success, "{result:?}");
    assert_eq!(resolver.secret_requests().len(), 2);
}

#[tokio::test]
async fn retry_question_on_the_rejection_line_is_answered() {
    let script = format!(
        r#"printf 'Enter password: '
read first
printf 'Invalid password. Attempt 2/3, Enter password: '
read second
[ "$second" = right ] && echo "{ADDR}""#
    );
    let resolver = ScriptedResolver::with_secrets(&["wrong", "right"]);
    let invocation = CommandInvocation::new("sh", Duration::from_secs(5)).args(["-c", &script]);
    let result = run_invocation(&invocation, &resolver, &NullSink, options()).await;

    assert!(result.success, "{result:?}");
    let requests = resolver.secret_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].label, "Enter your keystore password");
}

#[tokio::test]
async fn prompts_on_stderr_are_detected() {
    let script = format!(
        r#"printf 'Enter password: ' >&2
read pw
echo "ok {ADDR}""#
    );
    let resolver = ScriptedResolver::with_secrets(&["from-stderr"]);
    let sink = CapturingSink::default();
    let result = run_invocation(&fake_cli(&script), &resolver, &sink, options()).await;

    assert!(result.success, "{result:?}");
    assert!(!sink.stderr.lock().unwrap().contains("Enter password"));
    assert!(sink.stdout.lock().unwrap().contains(ADDR));
}

#[tokio::test]
async fn address_before_exit_suppresses_later_prompts() {
    let script = format!(
        r#"echo "Contract deployed at {ADDR}"
sleep 0.2
printf 'Enter password: '
read pw
exit 3"#
    );
    let resolver = ScriptedResolver::with_secrets(&["never-used"]);
    let result = run_invocation(&fake_cli(&script), &resolver, &NullSink, options()).await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.exit_code, Some(3));
    assert!(resolver.secret_requests().is_empty());
}

#[tokio::test]
async fn exit_zero_without_address_is_a_failure() {
    let result = run_invocation(
        &fake_cli("echo 'all good'; exit 0"),
        &ScriptedResolver::default(),
        &NullSink,
        options(),
    )
    .await;
    assert!(!result.success);
    assert_eq!(result.token, None);
    assert_eq!(result.exit_code, Some(0));
}

#[tokio::test]
async fn timeout_kills_the_cli_once() {
    let invocation = CommandInvocation::new("sh", Duration::from_millis(300))
        .args(["-c", "echo waiting; exec sleep 30"]);
    let started = std::time::Instant::now();
    let resolver = ScriptedResolver::default();
    let result = run_invocation(&invocation, &resolver, &NullSink, options()).await;

    assert!(!result.success);
    assert_eq!(result.message, "timed out");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn dismissed_password_prompt_cancels() {
    let resolver = ScriptedResolver {
        secrets: Mutex::new(VecDeque::from([None])),
        ..ScriptedResolver::default()
    };
    let result = run_invocation(
        &fake_cli("printf 'Enter password: '; read pw; echo never"),
        &resolver,
        &NullSink,
        options(),
    )
    .await;
    assert!(!result.success);
    assert_eq!(result.message, "cancelled by user");
}

#[tokio::test]
async fn missing_executable_short_circuits() {
    let invocation = CommandInvocation::new("/nonexistent/genlayer", Duration::from_secs(5))
        .args(["deploy", "--contract", "c.py"]);
    let resolver = ScriptedResolver::default();
    let result = run_invocation(&invocation, &resolver, &NullSink, options()).await;

    assert!(!result.success);
    assert!(result.message.starts_with("/nonexistent/genlayer:"), "{}", result.message);
    assert!(result.output.is_empty());
    assert_eq!(result.exit_code, None);
}
