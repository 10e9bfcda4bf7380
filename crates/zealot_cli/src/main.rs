//! Zealot CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration or store error
//! - 4: Provisioning tool error (fetch, init or plan)
//! - 5: Apply error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

use zealot_core::CoreError;
use zealot_runner::{RunnerError, Stage};
use zealot_store::StoreError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const TOOL_ERROR: u8 = 4;
    pub const APPLY_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse errors exit with the documented code; --help and --version
    // print to stdout and exit zero.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ExitCodes::INVALID_ARGS)
            } else {
                ExitCode::from(ExitCodes::SUCCESS)
            };
        }
    };

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Map an error to its documented exit code.
///
/// Nothing below the CLI ever terminates the process; this is the one
/// place the fail-fast policy turns a classified error into an exit.
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(core) = e.downcast_ref::<CoreError>() {
        return match core {
            CoreError::Store(_) | CoreError::Template(_) => ExitCodes::CONFIG_ERROR,
            CoreError::Runner(RunnerError::StageFailed {
                stage: Stage::Apply,
                ..
            }) => ExitCodes::APPLY_ERROR,
            CoreError::Runner(_) => ExitCodes::TOOL_ERROR,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }
    // Connect failures surface before a run sequence exists.
    if e.downcast_ref::<StoreError>().is_some() {
        return ExitCodes::CONFIG_ERROR;
    }
    ExitCodes::GENERAL_ERROR
}
