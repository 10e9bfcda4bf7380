//! Store keys the resolver reads.

/// Resource name, under the job namespace.
pub const MODULE_RESOURCE_NAME: &str = "module/ResourceName";

/// Resource content payload, under the job namespace.
pub const MODULE_CONTENT: &str = "module/Content";

/// Target filename the resource manages, under the job namespace.
pub const MODULE_FILENAME: &str = "module/Filename";

/// Local working directory for the run, under the job namespace.
pub const WORKING_DIR: &str = "WorkingDir";

/// Autoapply flag, under the job namespace.
pub const AUTOAPPLY: &str = "autoapply";

/// Template key for a resource type, under the application namespace.
pub fn template(resource_type: &str) -> String {
    format!("{}/template", resource_type)
}
