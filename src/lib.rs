//! genvm-assist: lint and deploy GenVM intelligent contracts from the terminal.
//!
//! Both actions are delegated to external CLIs. This crate runs them, turns
//! linter JSON into diagnostics, and drives the deploy CLI interactively,
//! answering its keypair and password prompts.
//!
//! # Quick start
//!
//! ```no_run
//! use genvm_assist::config::load_config;
//! use genvm_assist::deploy::deploy_contract;
//! use genvm_assist::runner::{NullSink, PresetResolver};
//! use std::path::Path;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let resolver = PresetResolver { create_keypair: Some(true), password: None };
//! let result = deploy_contract(&config, Path::new("contract.py"), &resolver, &NullSink)
//!     .await
//!     .unwrap();
//! println!("{}", result.message);
//! # }
//! ```

pub mod build_info;
pub mod config;
pub mod deploy;
pub mod error;
pub mod lint;
pub mod logging;
pub mod runner;
#[cfg(test)]
pub mod testsupport;
pub mod ui;
