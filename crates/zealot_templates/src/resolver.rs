//! Fetches the template and module parameters for a run.

use std::path::PathBuf;

use tracing::debug;

use zealot_store::{Lookup, NamespacedKv};

use crate::error::TemplateResult;
use crate::keys;
use crate::module::Module;

/// Everything the store must provide before a run may touch the outside
/// world.
#[derive(Debug, Clone)]
pub struct JobInputs {
    pub template: String,
    pub module: Module,
    pub working_dir: PathBuf,
    pub autoapply: bool,
}

/// Resolves a run's template and parameters from the two configuration
/// domains.
///
/// Every key is required. The first miss aborts resolution, which keeps a
/// misconfigured run from ever invoking an external process or writing a
/// file.
pub struct JobResolver<'a> {
    app: &'a NamespacedKv,
    job: &'a NamespacedKv,
}

impl<'a> JobResolver<'a> {
    pub fn new(app: &'a NamespacedKv, job: &'a NamespacedKv) -> Self {
        Self { app, job }
    }

    /// Fetch the template for `resource_type` and the module parameters
    /// for the run.
    pub async fn resolve(&self, resource_type: &str) -> TemplateResult<JobInputs> {
        let resource_name = self
            .job
            .get_string(keys::MODULE_RESOURCE_NAME, Lookup::Required)
            .await?;
        let content = self
            .job
            .get_string(keys::MODULE_CONTENT, Lookup::Required)
            .await?;
        let working_dir = self
            .job
            .get_string(keys::WORKING_DIR, Lookup::Required)
            .await?;
        let filename = self
            .job
            .get_string(keys::MODULE_FILENAME, Lookup::Required)
            .await?;
        let autoapply = self.job.get_bool(keys::AUTOAPPLY, Lookup::Required).await?;

        let template = self
            .app
            .get_string(&keys::template(resource_type), Lookup::Required)
            .await?;

        debug!(
            "resolved module '{}' for resource type '{}'",
            resource_name, resource_type
        );

        Ok(JobInputs {
            template,
            module: Module {
                resource_name,
                content,
                filename,
                state_path: self.job.state_path(),
            },
            working_dir: PathBuf::from(working_dir),
            autoapply,
        })
    }
}
