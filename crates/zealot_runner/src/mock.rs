//! Scripted provisioner for tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{Provisioner, PLAN_FILE};
use crate::stage::{PlanOutcome, Stage, StageOutput};

/// One captured provisioner call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub method: &'static str,
    pub workdir: PathBuf,
}

/// Scripted stand-in for the real tool.
///
/// Clones share state, so a test keeps one handle for scripting and
/// verification while the code under test owns another. A scripted plan
/// exit code of 2 writes the scripted artifact bytes into the working
/// directory exactly like the real tool does.
#[derive(Clone)]
pub struct MockProvisioner {
    fetch_failure: Arc<RwLock<Option<String>>>,
    init_exit_code: Arc<RwLock<i32>>,
    init_output: Arc<RwLock<String>>,
    plan_exit_code: Arc<RwLock<i32>>,
    plan_output: Arc<RwLock<String>>,
    plan_artifact: Arc<RwLock<Vec<u8>>>,
    apply_exit_code: Arc<RwLock<i32>>,
    apply_output: Arc<RwLock<String>>,
    calls: Arc<RwLock<Vec<CapturedCall>>>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self {
            fetch_failure: Arc::new(RwLock::new(None)),
            init_exit_code: Arc::new(RwLock::new(0)),
            init_output: Arc::new(RwLock::new("mock init output".to_string())),
            plan_exit_code: Arc::new(RwLock::new(0)),
            plan_output: Arc::new(RwLock::new("mock plan output".to_string())),
            plan_artifact: Arc::new(RwLock::new(b"mock plan artifact".to_vec())),
            apply_exit_code: Arc::new(RwLock::new(0)),
            apply_output: Arc::new(RwLock::new("mock apply output".to_string())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Make the fetch stage fail.
    pub fn fail_fetch(self, detail: impl Into<String>) -> Self {
        *self.fetch_failure.write() = Some(detail.into());
        self
    }

    /// Script the init stage's exit code.
    pub fn with_init_exit_code(self, code: i32) -> Self {
        *self.init_exit_code.write() = code;
        self
    }

    /// Script the plan stage's detailed exit code.
    pub fn with_plan_exit_code(self, code: i32) -> Self {
        *self.plan_exit_code.write() = code;
        self
    }

    /// Script the plan stage's captured output.
    pub fn with_plan_output(self, output: impl Into<String>) -> Self {
        *self.plan_output.write() = output.into();
        self
    }

    /// Script the bytes the plan stage writes as its artifact.
    pub fn with_plan_artifact(self, artifact: impl Into<Vec<u8>>) -> Self {
        *self.plan_artifact.write() = artifact.into();
        self
    }

    /// Script the apply stage's exit code.
    pub fn with_apply_exit_code(self, code: i32) -> Self {
        *self.apply_exit_code.write() = code;
        self
    }

    /// Script the apply stage's captured output.
    pub fn with_apply_output(self, output: impl Into<String>) -> Self {
        *self.apply_output.write() = output.into();
        self
    }

    /// All captured calls in order.
    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls.read().clone()
    }

    /// Number of captured calls.
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Whether `method` was ever invoked.
    pub fn was_called(&self, method: &str) -> bool {
        self.calls.read().iter().any(|call| call.method == method)
    }

    fn record(&self, method: &'static str, workdir: &Path) {
        self.calls.write().push(CapturedCall {
            method,
            workdir: workdir.to_path_buf(),
        });
    }

    fn stage_output(stage: Stage, exit_code: i32, text: &str) -> StageOutput {
        let now = Utc::now();
        StageOutput {
            stage,
            exit_code,
            stdout: text.to_string(),
            stderr: String::new(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }
}

impl Default for MockProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provisioner for MockProvisioner {
    async fn fetch_tool(&self, _version: &str, workdir: &Path) -> RunnerResult<PathBuf> {
        self.record("fetch_tool", workdir);
        if let Some(detail) = self.fetch_failure.read().clone() {
            return Err(RunnerError::InstallFailed(detail));
        }
        Ok(workdir.join("bin/terraform"))
    }

    async fn init(&self, workdir: &Path) -> RunnerResult<StageOutput> {
        self.record("init", workdir);
        let code = *self.init_exit_code.read();
        let out = Self::stage_output(Stage::Init, code, &self.init_output.read());
        if code != 0 {
            return Err(RunnerError::StageFailed {
                stage: Stage::Init,
                code,
                output: out.combined_output(),
            });
        }
        Ok(out)
    }

    async fn plan(&self, workdir: &Path) -> RunnerResult<PlanOutcome> {
        self.record("plan", workdir);
        let code = *self.plan_exit_code.read();
        let out = Self::stage_output(Stage::Plan, code, &self.plan_output.read());
        match code {
            0 => Ok(PlanOutcome::NoChanges(out)),
            2 => {
                std::fs::write(workdir.join(PLAN_FILE), self.plan_artifact.read().as_slice())?;
                Ok(PlanOutcome::Changes(out))
            }
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
        self.record("apply", workdir);
        let code = *self.apply_exit_code.read();
        let out = Self::stage_output(Stage::Apply, code, &self.apply_output.read());
        if code != 0 {
            return Err(RunnerError::StageFailed {
                stage: Stage::Apply,
                code,
                output: out.combined_output(),
            });
        }
        Ok(out)
    }
}
