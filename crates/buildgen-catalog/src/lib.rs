//! Type catalog model and loading for buildgen.
//!
//! This crate defines the input side of the generator: the `TypeCatalog`
//! mapping type names to `TypeDescriptor` records, string newtypes for package
//! names and proto paths, and all-or-nothing loading from JSON or TOML files.

pub mod catalog;
pub mod types;

pub use catalog::{
    load_catalog_file, parse_catalog_str, CatalogError, CatalogFormat, TypeCatalog,
    TypeDescriptor,
};
pub use types::{PackageName, ProtoPath, TypeName};
