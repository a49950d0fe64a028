//! Rendering of the API `BUILD` manifest.
//!
//! The manifest text lives in `templates/api_build.hbs`. Placeholders are
//! filled from a fixed context struct and the registry runs in strict mode, so
//! a placeholder the context does not supply is a render error rather than an
//! empty substitution.

use crate::deps::DependencyList;
use handlebars::{no_escape, Handlebars};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

const TEMPLATE_NAME: &str = "api_build";
const API_BUILD_TEMPLATE: &str = include_str!("../templates/api_build.hbs");
const DEP_INDENT: &str = "        ";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid manifest template: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("failed to render manifest: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Formatted dependency lists, one per version family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyLists {
    pub legacy: DependencyList,
    pub current: DependencyList,
    pub transport_schema: DependencyList,
}

#[derive(Serialize)]
struct TemplateContext {
    legacy_deps: String,
    current_deps: String,
    transport_deps: String,
}

/// Rendered `BUILD` file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest(String);

impl Manifest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct ManifestRenderer {
    registry: Handlebars<'static>,
}

impl ManifestRenderer {
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template(API_BUILD_TEMPLATE)
    }

    fn with_template(source: &str) -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Bazel labels contain quotes and slashes; emit them verbatim.
        registry.register_escape_fn(no_escape);
        registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(Self { registry })
    }

    pub fn render(&self, lists: &FamilyLists) -> Result<Manifest, RenderError> {
        let context = TemplateContext {
            legacy_deps: deps_block(&lists.legacy),
            current_deps: deps_block(&lists.current),
            transport_deps: deps_block(&lists.transport_schema),
        };
        Ok(Manifest(self.registry.render(TEMPLATE_NAME, &context)?))
    }
}

/// One `"<label>",` line per reference, indented to sit inside `deps = [...]`.
fn deps_block(list: &DependencyList) -> String {
    list.references()
        .iter()
        .map(|reference| format!("{DEP_INDENT}\"{reference}\","))
        .collect::<Vec<_>>()
        .join("\n")
}
