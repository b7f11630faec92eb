//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::defaults::MAX_DEBOUNCE_MS;
use super::env::apply_runtime_env_overrides;
use super::init::config_root_dir;
use super::sources::{read_config_text_with_sources, ConfigSource};
use super::Config;

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    Ok(load_config_with_source(path_override)?.0)
}

/// Load configuration and report which source supplied it.
pub fn load_config_with_source(
    path_override: Option<&str>,
) -> Result<(Config, ConfigSource), ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<(Config, ConfigSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&mut config)?;
    Ok((config, source))
}

fn validate(config: &mut Config) -> Result<(), ConfigError> {
    if config.linter.program.trim().is_empty() {
        return Err(ConfigError::Invalid("linter.program must not be empty".into()));
    }
    if config.deploy.program.trim().is_empty() {
        return Err(ConfigError::Invalid("deploy.program must not be empty".into()));
    }
    if config.prompts.debounce_ms > MAX_DEBOUNCE_MS {
        return Err(ConfigError::Invalid(format!(
            "prompts.debounce_ms = {} exceeds the {MAX_DEBOUNCE_MS}ms limit",
            config.prompts.debounce_ms
        )));
    }
    if config.prompts.min_password_len == 0 {
        return Err(ConfigError::Invalid(
            "prompts.min_password_len must be at least 1".into(),
        ));
    }
    config.linter.timeout_secs = config.linter.timeout_secs.max(1);
    config.deploy.timeout_secs = config.deploy.timeout_secs.max(1);
    if let Some(rpc) = config.deploy.rpc.as_deref() {
        if rpc.trim().is_empty() {
            config.deploy.rpc = None;
        }
    }
    Ok(())
}
