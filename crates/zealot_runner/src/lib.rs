//! # zealot_runner
//!
//! Provisioning tool execution for zealot runs.
//!
//! The external tool is driven through the [`Provisioner`] trait in four
//! stages: fetch, init, plan and apply. [`TerraformCli`] is the real
//! implementation, running a per-run terraform binary fetched by
//! [`ReleaseInstaller`]; [`MockProvisioner`] scripts every stage for
//! tests.
//!
//! The plan stage runs with detailed exit codes and classifies them into
//! [`PlanOutcome`]: 0 means no changes, 2 means a plan artifact with
//! pending changes, 1 is a tool error and anything else is an explicit
//! [`RunnerError::UnexpectedExitCode`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use zealot_runner::{Provisioner, TerraformCli};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tool = TerraformCli::new();
//!     let workdir = Path::new("/tmp/zealot/demo");
//!
//!     tool.fetch_tool("0.11.1", workdir).await?;
//!     let out = tool.init(workdir).await?;
//!     println!("{}", out.combined_output());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod install;
pub mod mock;
pub mod runner;
pub mod stage;
pub mod terraform;

pub use error::{RunnerError, RunnerResult};
pub use install::ReleaseInstaller;
pub use mock::{CapturedCall, MockProvisioner};
pub use runner::{Provisioner, PLAN_FILE};
pub use stage::{PlanOutcome, Stage, StageOutput};
pub use terraform::TerraformCli;
