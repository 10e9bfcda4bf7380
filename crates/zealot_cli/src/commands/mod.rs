//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod run;

/// zealot - store-driven provisioning runs
#[derive(Parser)]
#[command(name = "zealot")]
#[command(version, about = "zealot - store-driven provisioning runs")]
#[command(long_about = r#"
Zealot executes one provisioning run for a named resource, driven entirely
by configuration in the backing store:

  1. resolve the run's template and module parameters from the store
  2. fetch the pinned terraform release into the run's working directory
  3. render the provisioning file and run init
  4. run plan with detailed exit codes and persist the results
  5. run apply only when changes are pending and autoapply is set

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration or store error
  4 - Provisioning tool error (fetch, init or plan)
  5 - Apply error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute one provisioning run for a named resource
    Run(run::RunArgs),
}
