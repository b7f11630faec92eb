//! Prompt session state machine for one invocation.
//!
//! All prompt bookkeeping for a child process lives in [`PromptSession`]: the
//! current state, the per-category "already handled" flags, the queue of
//! prompts that arrived while another one was being answered, and the
//! unterminated tail of the last chunk. Transitions are plain methods taking
//! the current instant, so the debounce logic is testable without timers.

use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};

use super::classify::{classify_line, LineClass, PromptCategory, PromptKind};

/// Longest unterminated line kept between chunks.
const MAX_TAIL_BYTES: usize = 4096;

/// A prompt detected in the output stream, waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    /// Latest text of the prompt line.
    pub text: String,
    pub kind: PromptKind,
    /// Set once the prompt has been handed out for resolution.
    pub handled: bool,
}

impl PendingPrompt {
    fn new(kind: PromptKind, text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            kind,
            handled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Prompt text is accumulating until `ready_at`.
    AwaitingPrompt {
        prompt: PendingPrompt,
        ready_at: Instant,
    },
    /// A prompt of this kind is with the resolver.
    Resolving(PromptKind),
    /// Success token seen; prompts are no longer handled.
    Done,
}

/// What one chunk of output meant to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// The chunk raised or extended a prompt that still needs an answer.
    pub prompt: bool,
    /// The parts of the chunk that are ordinary output, in order.
    pub passthrough: String,
}

impl Observation {
    fn output(chunk: &str) -> Self {
        Self {
            prompt: false,
            passthrough: chunk.to_string(),
        }
    }
}

/// Byte offsets of one line inside the text being classified.
#[derive(Debug, Clone, Copy)]
struct LineSpan {
    start: usize,
    end: usize,
    /// Start of the following line, past the delimiter.
    next: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HandledFlags {
    keypair: bool,
    password: bool,
}

impl HandledFlags {
    fn get(&self, category: PromptCategory) -> bool {
        match category {
            PromptCategory::Keypair => self.keypair,
            PromptCategory::Password => self.password,
        }
    }

    fn set(&mut self, category: PromptCategory, value: bool) {
        match category {
            PromptCategory::Keypair => self.keypair = value,
            PromptCategory::Password => self.password = value,
        }
    }
}

#[derive(Debug)]
pub struct PromptSession {
    state: SessionState,
    handled: HandledFlags,
    queued: VecDeque<PendingPrompt>,
    tail: String,
    debounce: Duration,
}

impl PromptSession {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            handled: HandledFlags::default(),
            queued: VecDeque::new(),
            tail: String::new(),
            debounce,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == SessionState::Done
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.state, SessionState::Resolving(_))
    }

    /// Number of prompts waiting behind the one currently in flight.
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Instant at which the pending prompt becomes ready, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            SessionState::AwaitingPrompt { ready_at, .. } => Some(*ready_at),
            _ => None,
        }
    }

    /// Feed one chunk of child output.
    ///
    /// Lines are classified in order, so a success signal and a follow-up
    /// prompt in the same chunk are both honoured. Lines that raised a prompt
    /// are left out of the returned passthrough text.
    pub fn observe(&mut self, chunk: &str, now: Instant) -> Observation {
        if self.is_done() {
            return Observation::output(chunk);
        }

        let carried = std::mem::take(&mut self.tail);
        // A signal on the carried line took effect when the line was first seen.
        let carried_signal =
            !carried.trim().is_empty() && classify_line(&carried).is_reset_signal();
        let chunk_start = carried.len();
        let mut text = carried;
        text.push_str(chunk);

        let lines = split_lines(&text);
        let mut saw_prompt = false;
        let mut hidden: Vec<Range<usize>> = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let segment = &text[line.start..line.end];
            if segment.trim().is_empty() {
                continue;
            }
            let class = classify_line(segment);
            if class.is_reset_signal() && !(index == 0 && carried_signal) {
                self.handled.set(PromptCategory::Password, false);
            }
            let kind = match class {
                LineClass::Prompt(kind) | LineClass::PasswordRejected(Some(kind)) => kind,
                _ => continue,
            };
            if self.register(kind, segment, now) {
                saw_prompt = true;
                let range = line.start.max(chunk_start)..line.next;
                if !range.is_empty() {
                    hidden.push(range);
                }
            }
        }

        let partial_start = lines.last().map_or(0, |line| line.start);
        self.tail = clip_tail(&text[partial_start..]);
        Observation {
            prompt: saw_prompt,
            passthrough: passthrough(&text, chunk_start, &hidden),
        }
    }

    /// Returns false when the prompt was ignored as already handled.
    fn register(&mut self, kind: PromptKind, text: &str, now: Instant) -> bool {
        if self.handled.get(kind.category()) {
            return false;
        }
        let rearmed = now.checked_add(self.debounce).unwrap_or(now);
        match &mut self.state {
            SessionState::Idle => {
                self.state = SessionState::AwaitingPrompt {
                    prompt: PendingPrompt::new(kind, text),
                    ready_at: rearmed,
                };
            }
            SessionState::AwaitingPrompt { prompt, ready_at }
                if prompt.kind.category() == kind.category() =>
            {
                // More text for the same question: merge and re-arm.
                prompt.kind = kind;
                prompt.text = text.trim().to_string();
                *ready_at = rearmed;
            }
            SessionState::AwaitingPrompt { .. } | SessionState::Resolving(_) => {
                self.enqueue(PendingPrompt::new(kind, text));
            }
            SessionState::Done => return false,
        }
        true
    }

    fn enqueue(&mut self, prompt: PendingPrompt) {
        let category = prompt.kind.category();
        if let Some(existing) = self
            .queued
            .iter_mut()
            .find(|queued| queued.kind.category() == category)
        {
            *existing = prompt;
        } else {
            self.queued.push_back(prompt);
        }
    }

    /// Hand out the pending prompt once its debounce window has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<PendingPrompt> {
        let ready = matches!(
            &self.state,
            SessionState::AwaitingPrompt { ready_at, .. } if now >= *ready_at
        );
        if !ready {
            return None;
        }
        let SessionState::AwaitingPrompt { mut prompt, .. } =
            std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            return None;
        };
        prompt.handled = true;
        self.handled.set(prompt.kind.category(), true);
        self.state = SessionState::Resolving(prompt.kind);
        Some(prompt)
    }

    /// The in-flight prompt was answered; promote the next queued one.
    pub fn finish_resolution(&mut self, now: Instant) {
        if !self.is_resolving() {
            return;
        }
        self.state = SessionState::Idle;
        while let Some(next) = self.queued.pop_front() {
            if self.handled.get(next.kind.category()) {
                continue;
            }
            // Queued text already had time to accumulate.
            self.state = SessionState::AwaitingPrompt {
                prompt: next,
                ready_at: now,
            };
            break;
        }
    }

    /// Success token observed: drop pending work and stop handling prompts.
    pub fn mark_done(&mut self) {
        self.state = SessionState::Done;
        self.queued.clear();
        self.tail.clear();
    }
}

/// Split on `\n` and `\r`. The last span is the unterminated remainder,
/// possibly empty.
fn split_lines(text: &str) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (index, c) in text.char_indices() {
        if c == '\n' || c == '\r' {
            spans.push(LineSpan {
                start,
                end: index,
                next: index + 1,
            });
            start = index + 1;
        }
    }
    spans.push(LineSpan {
        start,
        end: text.len(),
        next: text.len(),
    });
    spans
}

/// The chunk part of `text` (from `chunk_start`) minus the `hidden` ranges.
fn passthrough(text: &str, chunk_start: usize, hidden: &[Range<usize>]) -> String {
    let mut out = String::new();
    let mut cursor = chunk_start;
    for range in hidden {
        if range.start > cursor {
            out.push_str(&text[cursor..range.start]);
        }
        cursor = cursor.max(range.end);
    }
    out.push_str(&text[cursor..]);
    out
}

fn clip_tail(partial: &str) -> String {
    if partial.len() <= MAX_TAIL_BYTES {
        return partial.to_string();
    }
    let mut start = partial.len() - MAX_TAIL_BYTES;
    while !partial.is_char_boundary(start) {
        start += 1;
    }
    partial[start..].to_string()
}
