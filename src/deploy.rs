//! Contract deployment through the external deploy CLI.
//!
//! Checks the contract locally, assembles the deploy command line, and hands
//! it to the interactive runner, which answers keypair and password prompts.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::{Config, DeployConfig};
use crate::error::DeployError;
use crate::runner::{
    run_invocation, CommandInvocation, InvocationResult, OutputSink, PromptResolver,
    RunnerOptions,
};

/// Marker expected on the first line of a contract file.
const DEPENDS_MARKER: &str = "\"Depends\"";

/// Result of checking a contract before deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preflight {
    /// Absolute path handed to the deploy CLI.
    pub contract: PathBuf,
    /// Non-fatal findings worth showing the user.
    pub warnings: Vec<String>,
}

/// Validate the contract path. Only a missing file or a non-file is fatal.
pub fn preflight(contract: &Path) -> Result<Preflight, DeployError> {
    let display = contract.display().to_string();
    if !contract.exists() {
        return Err(DeployError::MissingContract(display));
    }
    if !contract.is_file() {
        return Err(DeployError::NotAFile(display));
    }
    let absolute = std::fs::canonicalize(contract).unwrap_or_else(|_| contract.to_path_buf());

    let mut warnings = Vec::new();
    match first_line(contract) {
        Ok(line) if has_depends_header(&line) => {}
        Ok(_) => warnings.push(format!(
            "{display} does not start with a `# {{ \"Depends\": ... }}` header; the deploy CLI may reject it"
        )),
        Err(e) => warnings.push(format!("could not read {display}: {e}")),
    }
    Ok(Preflight {
        contract: absolute,
        warnings,
    })
}

fn first_line(path: &Path) -> std::io::Result<String> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line)
}

fn has_depends_header(line: &str) -> bool {
    let line = line.trim_start_matches('\u{feff}').trim();
    line.starts_with('#') && line.contains(DEPENDS_MARKER)
}

/// Build `<program> [args] deploy --contract <path> [--rpc <url>]`.
///
/// Runs in the configured directory, or next to the contract.
pub fn deploy_invocation(config: &DeployConfig, contract: &Path) -> CommandInvocation {
    let mut invocation = CommandInvocation::new(config.program.as_str(), config.timeout())
        .args(config.args.iter().cloned())
        .arg("deploy")
        .arg("--contract")
        .arg(contract.to_string_lossy().into_owned());
    if let Some(rpc) = &config.rpc {
        invocation = invocation.arg("--rpc").arg(rpc.as_str());
    }
    let cwd = config
        .cwd
        .clone()
        .or_else(|| contract.parent().map(Path::to_path_buf))
        .filter(|dir| !dir.as_os_str().is_empty());
    match cwd {
        Some(dir) => invocation.cwd(dir),
        None => invocation,
    }
}

/// Deploy `contract`, answering prompts through `resolver`.
///
/// Preflight failures are returned as errors; everything after spawning is
/// reported through the returned [`InvocationResult`].
pub async fn deploy_contract(
    config: &Config,
    contract: &Path,
    resolver: &dyn PromptResolver,
    sink: &dyn OutputSink,
) -> Result<InvocationResult, DeployError> {
    let checked = preflight(contract)?;
    for warning in &checked.warnings {
        tracing::warn!("{warning}");
    }
    let invocation = deploy_invocation(&config.deploy, &checked.contract);
    tracing::info!(command = %invocation, "deploying");
    sink.status(&format!("running {invocation}"));

    let result = run_invocation(
        &invocation,
        resolver,
        sink,
        RunnerOptions::from(&config.prompts),
    )
    .await;
    if result.success {
        tracing::info!(address = ?result.token, "deploy succeeded");
    } else {
        tracing::warn!(message = %result.message, "deploy failed");
    }
    Ok(result)
}
