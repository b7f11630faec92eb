//! Default configuration constants.
//!
//! Keeping defaults in one module lets the data model, the loader and tests
//! share the same literals.

/// Embedded default config template written by `genvm-assist init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/genvm-assist.toml");
/// Local config file name looked up in the working directory.
pub(super) const LOCAL_CONFIG_FILE: &str = "genvm-assist.toml";
/// Directory under the user config root.
pub(super) const GLOBAL_CONFIG_DIR: &str = "genvm-assist";
/// File name inside [`GLOBAL_CONFIG_DIR`].
pub(super) const GLOBAL_CONFIG_FILE: &str = "config.toml";
/// Default linter executable.
pub(super) const DEFAULT_LINTER_PROGRAM: &str = "genvm-lint";
/// Default deploy CLI executable.
pub(super) const DEFAULT_DEPLOY_PROGRAM: &str = "genlayer";
/// Default timeout for one linter run.
pub(super) const DEFAULT_LINT_TIMEOUT_SECS: u64 = 30;
/// Default timeout for one deployment, prompts included.
pub(super) const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 300;
/// Default prompt debounce window.
pub(super) const DEFAULT_DEBOUNCE_MS: u64 = 100;
/// Upper bound accepted for the debounce window.
pub(super) const MAX_DEBOUNCE_MS: u64 = 5_000;
/// Default minimum length for new keystore passwords.
pub(super) const DEFAULT_MIN_PASSWORD_LEN: usize = 8;
