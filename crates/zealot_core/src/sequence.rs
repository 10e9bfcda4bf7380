//! The run sequencer: one strictly ordered init, plan, apply pass.

use std::fmt;
use std::fs;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use zealot_runner::{PlanOutcome, Provisioner, PLAN_FILE};
use zealot_store::{KvTransport, Namespace, NamespacedKv, ResourceLock};
use zealot_templates::{JobInputs, JobResolver, Renderer};

use crate::error::{CoreError, CoreResult};

/// Application name under which all store namespaces live.
pub const APP_NAME: &str = "zealot";

/// Rendered provisioning file name inside the working directory.
pub const MAIN_FILE: &str = "main.tf";

/// Store keys written back under the job namespace.
pub mod keys {
    /// Captured text of the last plan.
    pub const PLAN_TEXT: &str = "PlanText";

    /// Binary plan artifact copied out of the working directory.
    pub const PLANFILE: &str = "planfile";

    /// Set to "true" when the plan detected pending changes.
    pub const CHANGES_AVAILABLE: &str = "ChangesAvailable";
}

/// Identity and fixed parameters of one run.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub name: String,
    pub resource_type: String,
    pub workspace: String,
    pub tool_version: String,
}

impl RunSpec {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            workspace: "development".to_string(),
            tool_version: "0.11.1".to_string(),
        }
    }

    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }
}

/// Lifecycle of a run.
///
/// Transitions are strictly forward. A failed stage leaves the state
/// where it was; the run is then abandoned in place, never resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Uninitialized,
    Initialized,
    Planned,
    Applied,
    Skipped,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Uninitialized => "uninitialized",
            RunState::Initialized => "initialized",
            RunState::Planned => "planned",
            RunState::Applied => "applied",
            RunState::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the apply stage did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Pending changes were applied.
    Applied,
    /// No pending changes, or autoapply not set; the tool was not run.
    Skipped,
}

/// One ordered provisioning run against a named resource.
///
/// The sequencer owns the whole lifecycle: it takes the resource lock,
/// resolves configuration, renders and writes the provisioning file,
/// drives the tool through its stages and persists plan artifacts back to
/// the store. It never terminates the process; every failure is returned
/// as a classified [`CoreError`].
pub struct RunSequence {
    id: Uuid,
    spec: RunSpec,
    app: NamespacedKv,
    job: NamespacedKv,
    lock: ResourceLock,
    provisioner: Arc<dyn Provisioner>,
    state: RunState,
    inputs: Option<JobInputs>,
    rendered: Option<String>,
    plan_output: Option<String>,
    changes_available: bool,
    apply_output: Option<String>,
}

impl RunSequence {
    /// Build a run over the given transport and provisioner.
    pub fn new(
        spec: RunSpec,
        transport: Arc<dyn KvTransport>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Self {
        let app_ns = Namespace::app(APP_NAME);
        let job_ns = Namespace::job(APP_NAME, &spec.name);
        let lock = ResourceLock::new(&job_ns, transport.clone());
        Self {
            id: Uuid::new_v4(),
            spec,
            app: NamespacedKv::new(app_ns, transport.clone()),
            job: NamespacedKv::new(job_ns, transport),
            lock,
            provisioner,
            state: RunState::Uninitialized,
            inputs: None,
            rendered: None,
            plan_output: None,
            changes_available: false,
            apply_output: None,
        }
    }

    /// Unique id of this run.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Identity and parameters the run was built with.
    pub fn spec(&self) -> &RunSpec {
        &self.spec
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether the plan stage detected pending changes.
    pub fn changes_available(&self) -> bool {
        self.changes_available
    }

    /// The rendered provisioning file, once init has run.
    pub fn rendered_file(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    /// Captured plan text, once plan has run.
    pub fn plan_output(&self) -> Option<&str> {
        self.plan_output.as_deref()
    }

    /// Captured apply output, if the apply stage ran.
    pub fn apply_output(&self) -> Option<&str> {
        self.apply_output.as_deref()
    }

    fn expect_state(&self, expected: RunState, operation: &'static str) -> CoreResult<()> {
        if self.state != expected {
            return Err(CoreError::InvalidState {
                operation,
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn inputs(&self, operation: &'static str) -> CoreResult<&JobInputs> {
        self.inputs.as_ref().ok_or(CoreError::InvalidState {
            operation,
            expected: RunState::Initialized,
            actual: self.state,
        })
    }

    /// Prepare the run: take the resource lock, resolve configuration,
    /// fetch the tool, render and write the provisioning file and run the
    /// tool's init stage.
    ///
    /// Resolution happens before anything touches the filesystem or a
    /// process, so a misconfigured run has no side effects at all. The
    /// lock is held from here until [`RunSequence::apply`] finishes.
    pub async fn init(&mut self) -> CoreResult<()> {
        self.expect_state(RunState::Uninitialized, "init")?;
        info!(
            "[init] starting run {} for '{}' ({})",
            self.id, self.spec.name, self.spec.resource_type
        );

        self.lock.acquire().await?;

        let resolver = JobResolver::new(&self.app, &self.job);
        let inputs = resolver.resolve(&self.spec.resource_type).await?;

        fs::create_dir_all(&inputs.working_dir)?;
        self.provisioner
            .fetch_tool(&self.spec.tool_version, &inputs.working_dir)
            .await?;

        let rendered = Renderer::new().render_module(&inputs.template, &inputs.module)?;
        let file = inputs.working_dir.join(MAIN_FILE);
        fs::write(&file, &rendered)?;
        debug!("wrote rendered file {}", file.display());

        let out = self.provisioner.init(&inputs.working_dir).await?;
        info!("[init] {}", out.combined_output().trim_end());

        self.rendered = Some(rendered);
        self.inputs = Some(inputs);
        self.state = RunState::Initialized;
        Ok(())
    }

    /// Run the tool's plan stage and persist its results.
    ///
    /// What gets written depends on the outcome: no changes persists the
    /// plan text alone; pending changes persist the changes flag, the
    /// plan text and the binary artifact, in that order; a failed plan
    /// persists nothing.
    pub async fn plan(&mut self) -> CoreResult<()> {
        self.expect_state(RunState::Initialized, "plan")?;
        let workdir = self.inputs("plan")?.working_dir.clone();

        match self.provisioner.plan(&workdir).await? {
            PlanOutcome::NoChanges(out) => {
                let text = out.combined_output();
                info!("[plan] no changes\n{}", text.trim_end());
                self.job.set_value(keys::PLAN_TEXT, &text).await?;
                self.plan_output = Some(text);
            }
            PlanOutcome::Changes(out) => {
                let text = out.combined_output();
                info!("[plan] changes detected\n{}", text.trim_end());

                self.changes_available = true;
                self.job.set_value(keys::CHANGES_AVAILABLE, "true").await?;
                self.job.set_value(keys::PLAN_TEXT, &text).await?;

                let artifact = fs::read(workdir.join(PLAN_FILE))?;
                debug!("persisting {} byte plan artifact", artifact.len());
                self.job.set_bytes(keys::PLANFILE, &artifact).await?;
                self.plan_output = Some(text);
            }
        }

        self.state = RunState::Planned;
        Ok(())
    }

    /// Run the tool's apply stage when, and only when, the plan detected
    /// changes and autoapply is set; otherwise skip it.
    ///
    /// A skipped apply is a successful run outcome, not an error. The
    /// resource lock is released either way.
    pub async fn apply(&mut self) -> CoreResult<ApplyOutcome> {
        self.expect_state(RunState::Planned, "apply")?;
        let inputs = self.inputs("apply")?;
        let autoapply = inputs.autoapply;
        let workdir = inputs.working_dir.clone();

        if !(self.changes_available && autoapply) {
            info!("[apply] no changes available or autoapply not set, apply skipped");
            self.state = RunState::Skipped;
            self.release_lock().await;
            return Ok(ApplyOutcome::Skipped);
        }

        let out = self.provisioner.apply(&workdir).await?;
        info!("[apply] {}", out.combined_output().trim_end());

        self.apply_output = Some(out.combined_output());
        self.state = RunState::Applied;
        self.release_lock().await;
        Ok(ApplyOutcome::Applied)
    }

    // Release failures are logged, never returned; the session TTL
    // reclaims the lock on its own.
    async fn release_lock(&mut self) {
        if let Err(e) = self.lock.release().await {
            warn!("failed to release run lock: {}", e);
        }
    }
}
