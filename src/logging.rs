//! Diagnostic logging setup.
//!
//! Logs go to stderr through `tracing-subscriber`. `GENVM_ASSIST_LOG` takes
//! an `EnvFilter` directive; without it the level comes from `-v` flags.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "GENVM_ASSIST_LOG";

/// Default directive for a given number of `-v` flags.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "genvm_assist=info,warn",
        2 => "genvm_assist=debug,info",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: u8, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(verbosity > 1)
        .try_init();
}
