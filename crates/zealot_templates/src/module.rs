//! Module parameters substituted into the provisioning template.

use std::collections::HashMap;

/// Resource-specific parameters for one run.
///
/// `state_path` is always derived from the run's namespace rather than
/// stored, so the remote state location can never drift from the
/// configuration that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub resource_name: String,
    pub content: String,
    pub filename: String,
    pub state_path: String,
}

impl Module {
    /// Variable map consumed by the renderer.
    pub fn variables(&self) -> HashMap<String, String> {
        HashMap::from([
            ("ResourceName".to_string(), self.resource_name.clone()),
            ("Content".to_string(), self.content.clone()),
            ("Filename".to_string(), self.filename.clone()),
            ("StatePath".to_string(), self.state_path.clone()),
        ])
    }
}
