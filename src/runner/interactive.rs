//! Single-consumer driver for one interactive invocation.
//!
//! Both output streams feed one channel. The loop below is the only place
//! that touches the prompt session, the cumulative output, and the child's
//! stdin, so prompt handling is strictly sequential.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::extract::{find_address, find_delimited_address};
use super::process::{self, format_duration, StreamChunk};
use super::resolve::{resolve_prompt, PromptResolver, PromptResponse};
use super::session::{PendingPrompt, PromptSession};
use super::{CommandInvocation, InvocationResult, OutputSink, RunnerOptions, StreamKind};
use crate::error::RunnerError;

/// Bytes of earlier output rescanned with each chunk, so an address split
/// across two reads is still found.
const ADDRESS_LOOKBACK_BYTES: usize = 64;

/// Longest wait before an invocation is abandoned (one year).
const MAX_DEADLINE: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Run `invocation`, answering its prompts through `resolver`.
///
/// Never fails: spawn errors, timeouts and cancellations all come back as an
/// unsuccessful [`InvocationResult`] with a readable message.
pub async fn run_invocation(
    invocation: &CommandInvocation,
    resolver: &dyn PromptResolver,
    sink: &dyn OutputSink,
    options: RunnerOptions,
) -> InvocationResult {
    let deadline = deadline_after(invocation.timeout());
    let mut child = match process::spawn(invocation) {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command = %invocation, error = %e, "spawn failed");
            return InvocationResult::failure(String::new(), e.to_string());
        }
    };
    tracing::debug!(command = %invocation, pid = ?child.id(), "spawned");

    let (tx, rx) = mpsc::unbounded_channel();
    process::spawn_reader(child.stdout.take(), StreamKind::Stdout, tx.clone());
    process::spawn_reader(child.stderr.take(), StreamKind::Stderr, tx);
    let stdin = child.stdin.take();

    let driver = Driver {
        invocation,
        resolver,
        sink,
        options,
        deadline,
        session: PromptSession::new(options.debounce),
        child,
        stdin,
        rx,
        streams_open: true,
        exit: None,
        output: String::new(),
        token: None,
    };
    driver.run().await
}

/// Deadline for a run starting now. Timeouts too large to represent are
/// capped at [`MAX_DEADLINE`] from now.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout.min(MAX_DEADLINE)).unwrap_or(now)
}

/// How the child ended, once it has.
enum Exit {
    Status(ExitStatus),
    WaitFailed(std::io::Error),
}

struct Driver<'a> {
    invocation: &'a CommandInvocation,
    resolver: &'a dyn PromptResolver,
    sink: &'a dyn OutputSink,
    options: RunnerOptions,
    deadline: Instant,
    session: PromptSession,
    child: Child,
    stdin: Option<ChildStdin>,
    rx: mpsc::UnboundedReceiver<StreamChunk>,
    streams_open: bool,
    exit: Option<Exit>,
    output: String,
    token: Option<String>,
}

impl Driver<'_> {
    async fn run(mut self) -> InvocationResult {
        while self.streams_open || self.exit.is_none() {
            let debounce_at = self.session.next_deadline().map(Instant::from_std);
            tokio::select! {
                chunk = self.rx.recv(), if self.streams_open => match chunk {
                    Some(chunk) => self.absorb(chunk),
                    None => self.streams_open = false,
                },
                exit = self.child.wait(), if self.exit.is_none() => self.record_exit(exit),
                _ = sleep_until(debounce_at.unwrap_or(self.deadline)), if debounce_at.is_some() => {
                    if let Some(prompt) = self.session.take_ready(std::time::Instant::now()) {
                        if let Some(result) = self.handle_prompt(prompt).await {
                            return result;
                        }
                    }
                }
                _ = sleep_until(self.deadline) => return self.time_out().await,
            }
        }
        self.finish()
    }

    /// Append a chunk to the output, look for the success token, and feed
    /// the prompt session.
    fn absorb(&mut self, chunk: StreamChunk) {
        let scan_from = floor_char_boundary(
            &self.output,
            self.output.len().saturating_sub(ADDRESS_LOOKBACK_BYTES),
        );
        self.output.push_str(&chunk.text);

        if self.token.is_none() {
            if let Some(address) = find_delimited_address(&self.output[scan_from..]) {
                tracing::info!(%address, "success token observed");
                self.token = Some(address.to_string());
                self.session.mark_done();
                // Any later question now reads EOF instead of waiting on us.
                self.stdin = None;
            }
        }

        let observation = self.session.observe(&chunk.text, std::time::Instant::now());
        if !observation.passthrough.is_empty() {
            self.sink.output(chunk.stream, &observation.passthrough);
        }
    }

    fn record_exit(&mut self, exit: std::io::Result<ExitStatus>) {
        let exit = match exit {
            Ok(status) => {
                tracing::debug!(%status, "child exited");
                Exit::Status(status)
            }
            Err(e) => {
                tracing::warn!(error = %e, "waiting on child failed");
                Exit::WaitFailed(e)
            }
        };
        self.exit = Some(exit);
    }

    fn child_alive(&mut self) -> bool {
        if self.exit.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                self.record_exit(Ok(status));
                false
            }
            Err(e) => {
                self.record_exit(Err(e));
                false
            }
        }
    }

    /// Resolve one prompt while still draining output.
    ///
    /// Returns a final result only when the invocation must end here
    /// (cancellation or timeout).
    async fn handle_prompt(&mut self, prompt: PendingPrompt) -> Option<InvocationResult> {
        if !self.child_alive() {
            tracing::debug!(prompt = %prompt.text, "child already exited; prompt skipped");
            self.session.finish_resolution(std::time::Instant::now());
            return None;
        }
        tracing::debug!(kind = ?prompt.kind, prompt = %prompt.text, "resolving prompt");

        let resolver = self.resolver;
        let resolution = resolve_prompt(resolver, &prompt, self.options.min_password_len);
        tokio::pin!(resolution);

        let response = loop {
            tokio::select! {
                response = &mut resolution => break Some(response),
                chunk = self.rx.recv(), if self.streams_open => match chunk {
                    Some(chunk) => self.absorb(chunk),
                    None => self.streams_open = false,
                },
                exit = self.child.wait(), if self.exit.is_none() => {
                    self.record_exit(exit);
                    break None;
                }
                _ = sleep_until(self.deadline) => return Some(self.time_out().await),
            }
            if self.session.is_done() {
                break None;
            }
        };

        match response {
            None => {
                tracing::debug!("prompt abandoned");
            }
            Some(PromptResponse::Cancelled) => {
                tracing::info!(kind = ?prompt.kind, "prompt cancelled; killing child");
                self.kill().await;
                return Some(InvocationResult::failure(
                    std::mem::take(&mut self.output),
                    RunnerError::Cancelled.to_string(),
                ));
            }
            Some(PromptResponse::Reply(reply)) => {
                if self.child_alive() && !self.session.is_done() {
                    self.write_reply(&reply).await;
                } else {
                    tracing::debug!("child gone before reply could be written");
                }
            }
        }
        self.session.finish_resolution(std::time::Instant::now());
        None
    }

    async fn write_reply(&mut self, reply: &str) {
        let Some(stdin) = self.stdin.as_mut() else {
            return;
        };
        let written = async {
            stdin.write_all(reply.as_bytes()).await?;
            stdin.flush().await
        }
        .await;
        if let Err(e) = written {
            tracing::warn!(error = %RunnerError::from(e), "writing reply to child failed");
        }
    }

    async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!(error = %e, "kill failed");
        }
    }

    async fn time_out(&mut self) -> InvocationResult {
        let limit = self.invocation.timeout();
        tracing::warn!(
            command = %self.invocation,
            "timed out after {}; killing child",
            format_duration(limit)
        );
        self.kill().await;
        InvocationResult::failure(
            std::mem::take(&mut self.output),
            RunnerError::TimedOut(limit).to_string(),
        )
    }

    fn finish(mut self) -> InvocationResult {
        if self.token.is_none() {
            self.token = find_address(&self.output).map(str::to_string);
        }
        let exit_code = match &self.exit {
            Some(Exit::Status(status)) => status.code(),
            _ => None,
        };
        let message = match (&self.token, &self.exit) {
            (Some(address), _) => format!("address {address}"),
            (None, Some(Exit::WaitFailed(e))) => RunnerError::Io(clone_io_error(e)).to_string(),
            (None, _) => match exit_code {
                Some(code) => format!("no address in output (exit code {code})"),
                None => "no address in output (terminated by signal)".to_string(),
            },
        };
        InvocationResult {
            success: self.token.is_some(),
            output: self.output,
            token: self.token,
            message,
            exit_code,
        }
    }
}

fn clone_io_error(e: &std::io::Error) -> std::io::Error {
    std::io::Error::new(e.kind(), e.to_string())
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
