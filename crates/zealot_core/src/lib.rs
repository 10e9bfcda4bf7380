//! # zealot_core
//!
//! Run sequencing for zealot.
//!
//! A run is one strictly ordered pass over a named resource:
//!
//! 1. **init**: take the resource lock, resolve configuration from the
//!    store, fetch the pinned tool, render and write the provisioning
//!    file, run the tool's init stage
//! 2. **plan**: run the plan stage and persist its text, changes flag and
//!    binary artifact according to the detailed exit code
//! 3. **apply**: run the apply stage only when changes are pending and
//!    autoapply is set, then release the lock
//!
//! [`RunSequence`] enforces the ordering: each stage checks the
//! [`RunState`] it requires and a violation is a [`CoreError::InvalidState`],
//! not a silent reorder. Configuration resolution is all-or-nothing and
//! happens before any file or process side effect.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zealot_core::{RunSequence, RunSpec};
//! use zealot_runner::TerraformCli;
//! use zealot_store::HttpTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(HttpTransport::connect("127.0.0.1:8500").await?);
//!     let mut run = RunSequence::new(
//!         RunSpec::new("demo", "local_file"),
//!         transport,
//!         Arc::new(TerraformCli::new()),
//!     );
//!
//!     run.init().await?;
//!     run.plan().await?;
//!     run.apply().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod sequence;

pub use error::{CoreError, CoreResult};
pub use sequence::{keys, ApplyOutcome, RunSequence, RunSpec, RunState, APP_NAME, MAIN_FILE};
