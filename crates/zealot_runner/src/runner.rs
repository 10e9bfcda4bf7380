//! Provisioner trait covering the four run stages.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::RunnerResult;
use crate::stage::{PlanOutcome, StageOutput};

/// Name of the plan artifact the plan stage writes into the working
/// directory and the apply stage consumes.
pub const PLAN_FILE: &str = ".plan";

/// Drives the external provisioning tool for one run.
///
/// Implementations execute against a working directory owned exclusively
/// by the run. Every call blocks until the stage finishes; a hung tool
/// hangs the run.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Download the tool at `version` into `<workdir>/bin` and make it
    /// executable, returning the binary path.
    async fn fetch_tool(&self, version: &str, workdir: &Path) -> RunnerResult<PathBuf>;

    /// Run the tool's init subcommand against the rendered file.
    async fn init(&self, workdir: &Path) -> RunnerResult<StageOutput>;

    /// Run the tool's plan subcommand, classifying its detailed exit code.
    /// On [`PlanOutcome::Changes`] the plan artifact exists at
    /// `<workdir>/.plan`.
    async fn plan(&self, workdir: &Path) -> RunnerResult<PlanOutcome>;

    /// Run the tool's apply subcommand against the saved plan artifact.
    async fn apply(&self, workdir: &Path) -> RunnerResult<StageOutput>;
}
