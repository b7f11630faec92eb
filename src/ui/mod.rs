//! Terminal-facing UI: styled status output and interactive prompt dialogs.
//!
//! Orchestration code depends on the runner's `OutputSink` and
//! `PromptResolver` traits; the types here are their terminal implementations.

pub mod prompts;
pub mod renderer;
pub mod settings;

pub use prompts::TerminalResolver;
pub use renderer::Renderer;
