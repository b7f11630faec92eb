//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`GENVM_ASSIST_LINTER`, `GENVM_ASSIST_DEPLOYER`,
//!    `GENVM_ASSIST_RPC`, `GENVM_ASSIST_DEPLOY_TIMEOUT_SECS`)
//! 2. TOML file specified via `--config`
//! 3. `./genvm-assist.toml` in the current directory
//! 4. `$XDG_CONFIG_HOME/genvm-assist/config.toml` (or `~/.config/...`)
//! 5. Built-in defaults

mod defaults;
mod env;
mod init;
mod loader;
mod sources;
mod types;

pub use init::{
    config_root_dir, default_global_config_path, initialize_config_at_path,
    initialize_default_config,
};
pub use loader::{load_config, load_config_with_source};
pub use sources::ConfigSource;
pub use types::{
    Config, ConfigInitResult, DeployConfig, DisplayConfig, LinterConfig, LinterMode, PromptConfig,
};
