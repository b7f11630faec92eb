//! CLI entry point for genvm-assist.

mod cli;

use clap::Parser;
use std::path::Path;

use genvm_assist::build_info;
use genvm_assist::config::{
    initialize_default_config, load_config_with_source, Config, ConfigInitResult,
};
use genvm_assist::deploy::deploy_contract;
use genvm_assist::lint::{run_linter, LintFilter};
use genvm_assist::logging;
use genvm_assist::runner::{PresetFirst, PresetResolver};
use genvm_assist::ui::{Renderer, TerminalResolver};

use cli::{Args, Command, SeverityFilter};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let (mut config, source) = match load_config_with_source(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if args.no_color {
        config.display.color = false;
    }
    logging::init(args.verbose, config.display.color);
    tracing::debug!(version = %build_info::version_line(), ?source, "starting");

    let renderer = Renderer::new(config.display.color);
    let code = match args.command {
        Command::Lint {
            file,
            json,
            severity,
            exclude_rules,
        } => {
            let filter = LintFilter {
                errors_only: severity == Some(SeverityFilter::Error),
                exclude_rules,
            };
            run_lint(&config, &renderer, &file, json, &filter).await
        }
        Command::Deploy {
            contract,
            rpc,
            timeout,
            yes,
            password_env,
        } => {
            if let Some(rpc) = rpc {
                config.deploy.rpc = Some(rpc);
            }
            if let Some(secs) = timeout {
                config.deploy.timeout_secs = secs.max(1);
            }
            let presets = match preset_answers(yes, password_env.as_deref()) {
                Ok(presets) => presets,
                Err(msg) => {
                    renderer.error(&msg);
                    std::process::exit(2);
                }
            };
            run_deploy(&config, &renderer, &contract, presets).await
        }
        Command::Init { force } => run_init(&renderer, force),
    };
    // Exit explicitly: an abandoned terminal read may still hold a blocking
    // thread that would keep the runtime from shutting down.
    std::process::exit(code);
}

async fn run_lint(
    config: &Config,
    renderer: &Renderer,
    file: &Path,
    json: bool,
    filter: &LintFilter,
) -> i32 {
    let mut report = match run_linter(&config.linter, file).await {
        Ok(report) => report,
        Err(e) => {
            renderer.error(&e.to_string());
            return 2;
        }
    };
    filter.apply(&mut report);

    if json {
        match report.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                renderer.error(&format!("failed to encode diagnostics: {e}"));
                return 2;
            }
        }
    } else {
        renderer.lint_report(&report);
    }
    if report.has_errors() {
        1
    } else {
        0
    }
}

fn preset_answers(yes: bool, password_env: Option<&str>) -> Result<PresetResolver, String> {
    let password = match password_env {
        Some(var) => match std::env::var(var) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => return Err(format!("environment variable `{var}` is not set or empty")),
        },
        None => None,
    };
    Ok(PresetResolver {
        create_keypair: yes.then_some(true),
        password,
    })
}

async fn run_deploy(
    config: &Config,
    renderer: &Renderer,
    contract: &Path,
    presets: PresetResolver,
) -> i32 {
    let terminal = TerminalResolver::new(config.display.color);
    let resolver = PresetFirst {
        presets,
        fallback: &terminal,
    };

    renderer.section("deploy");
    renderer.field("contract", &contract.display().to_string());
    if let Some(rpc) = &config.deploy.rpc {
        renderer.field("rpc", rpc);
    }

    let result = match deploy_contract(config, contract, &resolver, renderer).await {
        Ok(result) => result,
        Err(e) => {
            renderer.error(&e.to_string());
            return 2;
        }
    };
    if result.success {
        let address = result.token.as_deref().unwrap_or_default();
        renderer.outcome(true, &format!("Contract deployed at {address}"));
        0
    } else {
        renderer.outcome(false, &format!("Deploy failed: {}", result.message));
        1
    }
}

fn run_init(renderer: &Renderer, force: bool) -> i32 {
    match initialize_default_config(force) {
        Ok(ConfigInitResult::Created { path }) => {
            renderer.activity(&format!("wrote {}", path.display()));
            0
        }
        Ok(ConfigInitResult::AlreadyInitialized { path }) => {
            renderer.warn(&format!(
                "{} already exists; use --force to overwrite",
                path.display()
            ));
            0
        }
        Ok(ConfigInitResult::Overwritten { path, backup_path }) => {
            renderer.activity(&format!("wrote {}", path.display()));
            renderer.field("backup", &backup_path.display().to_string());
            0
        }
        Err(e) => {
            renderer.error(&format!("failed to initialize config: {e}"));
            1
        }
    }
}
