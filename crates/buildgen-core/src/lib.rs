//! Manifest generation for versioned API type databases.
//!
//! This crate takes a loaded `TypeCatalog` through the generator pipeline:
//! version family classification (`ClassificationRules`), per-family package
//! sets with namespace exclusion, buildifier-ordered dependency lists, and
//! rendering of the fixed `BUILD` template. `generate_file` wires loading and
//! atomic writing around it. The `fixture` module writes JSON schema test
//! fixtures.

pub mod classify;
pub mod deps;
pub mod fixture;
pub mod package_set;
pub mod pipeline;
pub mod render;

pub use classify::{
    ClassificationRules, ExternalTarget, Placement, RuleError, VersionFamily,
    TRANSPORT_SCHEMA_TARGETS,
};
pub use deps::{build_order_key, package_reference, DependencyList};
pub use fixture::{FixtureError, FixtureWriter};
pub use package_set::{build_package_sets, BuildStats, PackageSet, PackageSets};
pub use pipeline::{
    family_lists, generate, generate_file, generate_with, write_manifest, GenerateReport,
    Generation,
};
pub use render::{FamilyLists, Manifest, ManifestRenderer, RenderError};

use buildgen_catalog::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read catalog {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        source: CatalogError,
    },
    #[error("failed to write manifest {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}
