//! Single-pass placeholder substitution.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{TemplateError, TemplateResult};
use crate::module::Module;

/// Expands `{{Name}}` placeholders in template text.
///
/// Substitution is a single pass: values are inserted literally and never
/// re-scanned, so a value containing `{{...}}` stays as-is in the output.
/// There are no conditionals, loops or includes. A placeholder with no
/// matching variable fails the render; template text must never reach the
/// provisioning tool with holes in it.
pub struct Renderer {
    variable_pattern: Regex,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            // Match {{variable_name}} pattern
            variable_pattern: Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}").unwrap(),
        }
    }

    /// Render `template` with the module's variables.
    pub fn render_module(&self, template: &str, module: &Module) -> TemplateResult<String> {
        self.render(template, &module.variables())
    }

    /// Render `template`, substituting every placeholder from `variables`.
    pub fn render(
        &self,
        template: &str,
        variables: &HashMap<String, String>,
    ) -> TemplateResult<String> {
        let mut missing: Vec<String> = Vec::new();
        let rendered = self
            .variable_pattern
            .replace_all(template, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                match variables.get(name) {
                    Some(value) => value.clone(),
                    None => {
                        missing.push(name.to_string());
                        String::new()
                    }
                }
            })
            .into_owned();

        if let Some(name) = missing.into_iter().next() {
            return Err(TemplateError::UnresolvedPlaceholder { name });
        }
        Ok(rendered)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
