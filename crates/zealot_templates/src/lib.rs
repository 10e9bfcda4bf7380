//! # zealot_templates
//!
//! Template resolution and rendering for zealot provisioning files.
//!
//! A run's provisioning file is produced in two steps:
//!
//! 1. [`JobResolver`] fetches the template (from the application domain)
//!    and the module parameters (from the job domain) out of the store
//! 2. [`Renderer`] substitutes `{{Name}}` placeholders in a single strict
//!    pass
//!
//! All resolution is fail-fast: every key is required and a template
//! placeholder without a value is an error, never empty output.
//!
//! ## Example
//!
//! ```rust
//! use zealot_templates::{Module, Renderer};
//!
//! let module = Module {
//!     resource_name: "web".to_string(),
//!     content: "hello".to_string(),
//!     filename: "index.html".to_string(),
//!     state_path: "jobconfig/zealot/demo/state".to_string(),
//! };
//!
//! let rendered = Renderer::new()
//!     .render_module("resource \"local_file\" \"{{ResourceName}}\" {}", &module)
//!     .unwrap();
//! assert!(rendered.contains("\"web\""));
//! ```

pub mod error;
pub mod keys;
pub mod module;
pub mod renderer;
pub mod resolver;

pub use error::{TemplateError, TemplateResult};
pub use module::Module;
pub use renderer::Renderer;
pub use resolver::{JobInputs, JobResolver};
