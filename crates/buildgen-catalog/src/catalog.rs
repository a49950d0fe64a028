use crate::types::{PackageName, ProtoPath, TypeName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON catalog: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse TOML catalog: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// On-disk serialization of a catalog, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Toml,
}

impl CatalogFormat {
    /// `.toml` selects TOML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => CatalogFormat::Toml,
            _ => CatalogFormat::Json,
        }
    }
}

/// One type record from the API type database.
///
/// Both fields are optional so a partial record deserializes; records without
/// a package are dropped during classification rather than failing the load.
/// Any other fields present in the catalog are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TypeDescriptor {
    #[serde(default)]
    pub qualified_package: Option<PackageName>,
    #[serde(default)]
    pub proto_path: Option<ProtoPath>,
}

impl TypeDescriptor {
    pub fn new(qualified_package: impl Into<PackageName>, proto_path: impl Into<ProtoPath>) -> Self {
        Self {
            qualified_package: Some(qualified_package.into()),
            proto_path: Some(proto_path.into()),
        }
    }

    /// The package, if present and non-empty.
    pub fn package(&self) -> Option<&PackageName> {
        self.qualified_package
            .as_ref()
            .filter(|pkg| !pkg.trim().is_empty())
    }

    /// The proto path, or `""` when absent.
    pub fn proto_path_str(&self) -> &str {
        self.proto_path.as_deref().unwrap_or("")
    }
}

/// The full catalog: type name to descriptor, iterated in name order.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TypeCatalog {
    #[serde(default)]
    pub types: BTreeMap<TypeName, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn from_descriptors<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeDescriptor)>,
        K: Into<TypeName>,
    {
        Self {
            types: entries
                .into_iter()
                .map(|(name, desc)| (name.into(), desc))
                .collect(),
        }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = (&TypeName, &TypeDescriptor)> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

pub fn parse_catalog_str(input: &str, format: CatalogFormat) -> Result<TypeCatalog, CatalogError> {
    let catalog: TypeCatalog = match format {
        CatalogFormat::Json => serde_json::from_str(input)?,
        CatalogFormat::Toml => toml::from_str(input)?,
    };
    debug!("parsed {} type descriptors ({format:?})", catalog.len());
    Ok(catalog)
}

/// Read and parse a catalog. Either the whole file loads or nothing does.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<TypeCatalog, CatalogError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_catalog_str(&content, CatalogFormat::from_path(path))
}
