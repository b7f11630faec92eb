//! Environment overrides.
//!
//! `GENVM_ASSIST_*` variables win over every config file.

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_LINTER: &str = "GENVM_ASSIST_LINTER";
pub(super) const ENV_DEPLOYER: &str = "GENVM_ASSIST_DEPLOYER";
pub(super) const ENV_RPC: &str = "GENVM_ASSIST_RPC";
pub(super) const ENV_DEPLOY_TIMEOUT: &str = "GENVM_ASSIST_DEPLOY_TIMEOUT_SECS";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(program) = non_empty(env_lookup(ENV_LINTER)) {
        config.linter.program = program;
    }
    if let Some(program) = non_empty(env_lookup(ENV_DEPLOYER)) {
        config.deploy.program = program;
    }
    if let Some(rpc) = non_empty(env_lookup(ENV_RPC)) {
        config.deploy.rpc = Some(rpc);
    }
    if let Some(timeout) = non_empty(env_lookup(ENV_DEPLOY_TIMEOUT)) {
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_DEPLOY_TIMEOUT} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // Zero would mean "time out immediately"; clamp instead.
        config.deploy.timeout_secs = parsed.max(1);
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
