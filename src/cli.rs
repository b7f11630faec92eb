//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use genvm_assist::build_info;

/// Lint and deploy GenVM intelligent contracts through their external CLIs.
#[derive(Debug, Parser)]
#[command(name = "genvm-assist", version, long_version = build_info::LONG_VERSION)]
pub struct Args {
    /// Path to config file (default: ./genvm-assist.toml or ~/.config/genvm-assist/config.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// More diagnostic logging on stderr (repeat for more).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the external linter on a contract and print its findings.
    Lint {
        /// Contract file to lint.
        file: PathBuf,

        /// Print diagnostics as JSON instead of text.
        #[arg(long = "json")]
        json: bool,

        /// Only report findings at this severity.
        #[arg(long = "severity", value_enum)]
        severity: Option<SeverityFilter>,

        /// Drop findings with this rule code (repeatable).
        #[arg(long = "exclude-rule", value_name = "CODE")]
        exclude_rules: Vec<String>,
    },
    /// Deploy a contract, answering the deploy CLI's keypair and password prompts.
    Deploy {
        /// Contract file to deploy.
        #[arg(long = "contract")]
        contract: PathBuf,

        /// RPC endpoint passed through as `--rpc`.
        #[arg(long = "rpc")]
        rpc: Option<String>,

        /// Give up (and kill the deploy CLI) after this many seconds.
        #[arg(long = "timeout", value_name = "SECS")]
        timeout: Option<u64>,

        /// Answer yes to "create a new keypair?" without asking.
        #[arg(long = "yes", short = 'y')]
        yes: bool,

        /// Read the keystore password from this environment variable instead of the terminal.
        #[arg(long = "password-env", value_name = "VAR")]
        password_env: Option<String>,
    },
    /// Write the default config file to ~/.config/genvm-assist/config.toml.
    Init {
        /// Overwrite an existing config, keeping a timestamped backup.
        #[arg(long = "force")]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SeverityFilter {
    Error,
}
