//! Process spawning and stream reading helpers shared by the runners.

use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use super::{CommandInvocation, StreamKind};
use crate::error::RunnerError;

const READ_BUFFER_BYTES: usize = 4096;

/// Output of a non-interactive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Decoded text read from one of the child's streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub stream: StreamKind,
    pub text: String,
}

/// Build the tokio command for an invocation, all three streams piped.
pub(super) fn spawn(invocation: &CommandInvocation) -> Result<Child, RunnerError> {
    let mut cmd = command_for(invocation);
    cmd.stdin(Stdio::piped());
    cmd.spawn().map_err(|source| RunnerError::Spawn {
        program: invocation.program().to_string(),
        source,
    })
}

fn command_for(invocation: &CommandInvocation) -> Command {
    // Arguments go through argv, never through a shell.
    let mut cmd = Command::new(invocation.program());
    // Dropping the owning future (timeout, cancellation) must not leak children.
    cmd.kill_on_drop(true);
    cmd.args(invocation.arguments())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = invocation.working_dir() {
        cmd.current_dir(dir);
    }
    cmd
}

/// Run a command to completion without any interaction.
///
/// stdin is closed so a child that unexpectedly prompts fails fast instead of
/// hanging until the timeout.
pub async fn run_captured(invocation: &CommandInvocation) -> Result<CapturedOutput, RunnerError> {
    let mut cmd = command_for(invocation);
    cmd.stdin(Stdio::null());
    let child = cmd.spawn().map_err(|source| RunnerError::Spawn {
        program: invocation.program().to_string(),
        source,
    })?;

    let limit = invocation.timeout();
    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            tracing::warn!(
                command = %invocation,
                "command timed out after {}",
                format_duration(limit)
            );
            return Err(RunnerError::TimedOut(limit));
        }
    };

    Ok(CapturedOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Forward one child stream into `tx` until EOF.
pub(super) fn spawn_reader<R>(
    reader: Option<R>,
    stream: StreamKind,
    tx: mpsc::UnboundedSender<StreamChunk>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let Some(mut reader) = reader else {
        return;
    };
    tokio::spawn(async move {
        let mut buf = [0u8; READ_BUFFER_BYTES];
        let mut decoder = Utf8Carry::default();
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.decode(&buf[..n]);
                    if text.is_empty() {
                        continue;
                    }
                    if tx.send(StreamChunk { stream, text }).is_err() {
                        // Consumer is gone; nothing left to deliver to.
                        return;
                    }
                }
                Err(e) => {
                    tracing::debug!(?stream, error = %e, "stream read failed");
                    break;
                }
            }
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            let _ = tx.send(StreamChunk { stream, text: rest });
        }
    });
}

/// Incremental UTF-8 decoder that carries split multi-byte sequences over
/// to the next read instead of replacing them.
#[derive(Debug, Default)]
pub(super) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub(super) fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            let (valid, invalid_len, complete) = match std::str::from_utf8(&self.pending) {
                Ok(text) => (text.len(), None, true),
                Err(e) => (e.valid_up_to(), e.error_len(), false),
            };
            out.push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
            if complete {
                self.pending.clear();
                break;
            }
            match invalid_len {
                Some(len) => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + len);
                }
                None => {
                    // Incomplete sequence at the end: keep it for the next read.
                    self.pending.drain(..valid);
                    break;
                }
            }
        }
        out
    }

    pub(super) fn finish(&mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

/// Human-oriented duration formatting used in log and error messages.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs == 0 {
        return format!("{millis}ms");
    }
    if millis == 0 {
        if secs % 3600 == 0 {
            return format!("{}h", secs / 3600);
        }
        if secs % 60 == 0 {
            return format!("{}m", secs / 60);
        }
        return format!("{secs}s");
    }
    format!("{secs}.{millis:03}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_prefers_human_units() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(7)), "7s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
        assert_eq!(format_duration(Duration::from_millis(1250)), "1.250s");
    }

    #[test]
    fn utf8_carry_joins_split_sequences() {
        let glyph = "✔ ok".as_bytes();
        let mut decoder = Utf8Carry::default();
        assert_eq!(decoder.decode(&glyph[..1]), "");
        assert_eq!(decoder.decode(&glyph[1..2]), "");
        assert_eq!(decoder.decode(&glyph[2..]), "✔ ok");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn utf8_carry_replaces_invalid_bytes() {
        let mut decoder = Utf8Carry::default();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn utf8_carry_flushes_truncated_tail_on_finish() {
        let mut decoder = Utf8Carry::default();
        assert_eq!(decoder.decode(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let inv = CommandInvocation::new("genvm-assist-no-such-binary", Duration::from_secs(1));
        let err = run_captured(&inv).await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }), "got: {err}");
        assert!(err.to_string().starts_with("genvm-assist-no-such-binary:"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let inv = CommandInvocation::new("sh", Duration::from_secs(5))
            .args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = run_captured(&inv).await.unwrap();
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captured_run_times_out() {
        let inv = CommandInvocation::new("sh", Duration::from_millis(100))
            .args(["-c", "exec sleep 5"]);
        let err = run_captured(&inv).await.unwrap_err();
        assert!(matches!(err, RunnerError::TimedOut(_)), "got: {err}");
    }
}
