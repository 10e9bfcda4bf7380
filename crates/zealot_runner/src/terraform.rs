//! Terraform execution over a per-run local binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{RunnerError, RunnerResult};
use crate::install::ReleaseInstaller;
use crate::runner::{Provisioner, PLAN_FILE};
use crate::stage::{PlanOutcome, Stage, StageOutput};

/// Tool binary location relative to the working directory.
const TOOL_PATH: &str = "bin/terraform";

/// Terraform CLI driver.
///
/// The binary lives at `<workdir>/bin/terraform`, fetched per run so the
/// pinned version can never collide with a system-wide install. Every
/// subcommand runs with the working directory as its current directory
/// and blocks to completion; output is captured, not streamed.
pub struct TerraformCli {
    installer: ReleaseInstaller,
}

impl TerraformCli {
    pub fn new() -> Self {
        Self {
            installer: ReleaseInstaller::default(),
        }
    }

    /// Use a non-default release source (mirrors, tests).
    pub fn with_installer(installer: ReleaseInstaller) -> Self {
        Self { installer }
    }

    fn run_stage(&self, workdir: &Path, stage: Stage, args: &[&str]) -> RunnerResult<StageOutput> {
        let tool = workdir.join(TOOL_PATH);
        debug!("executing {} {} in {}", tool.display(), args.join(" "), workdir.display());

        let started_at = Utc::now();
        let output = Command::new(&tool)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|source| RunnerError::Spawn { stage, source })?;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds() as u64;

        let exit_code = output
            .status
            .code()
            .ok_or(RunnerError::Signalled { stage })?;

        Ok(StageOutput {
            stage,
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            started_at,
            finished_at,
            duration_ms,
        })
    }
}

impl Default for TerraformCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provisioner for TerraformCli {
    async fn fetch_tool(&self, version: &str, workdir: &Path) -> RunnerResult<PathBuf> {
        self.installer.install(version, workdir).await
    }

    async fn init(&self, workdir: &Path) -> RunnerResult<StageOutput> {
        info!("[init] running in {}", workdir.display());
        let out = self.run_stage(workdir, Stage::Init, &["init", "-input=false"])?;
        if !out.success() {
            return Err(RunnerError::StageFailed {
                stage: Stage::Init,
                code: out.exit_code,
                output: out.combined_output(),
            });
        }
        Ok(out)
    }

    async fn plan(&self, workdir: &Path) -> RunnerResult<PlanOutcome> {
        info!("[plan] running in {}", workdir.display());
        let out = self.run_stage(
            workdir,
            Stage::Plan,
            &["plan", "-out", PLAN_FILE, "-detailed-exitcode", "-no-color"],
        )?;
        debug!("plan exited with code {}", out.exit_code);

        // Detailed exit codes: 0 no changes, 1 error, 2 changes pending.
        match out.exit_code {
            0 => Ok(PlanOutcome::NoChanges(out)),
            2 => Ok(PlanOutcome::Changes(out)),
            1 => Err(RunnerError::PlanFailed {
                output: out.combined_output(),
            }),
            code => Err(RunnerError::UnexpectedExitCode {
                code,
                output: out.combined_output(),
            }),
        }
    }

    async fn apply(&self, workdir: &Path) -> RunnerResult<StageOutput> {
        info!("[apply] running in {}", workdir.display());
        let out = self.run_stage(workdir, Stage::Apply, &["apply", "-input=false", PLAN_FILE])?;
        if !out.success() {
            return Err(RunnerError::StageFailed {
                stage: Stage::Apply,
                code: out.exit_code,
                output: out.combined_output(),
            });
        }
        Ok(out)
    }
}
