use crate::classify::ClassificationRules;
use crate::deps::DependencyList;
use crate::package_set::{build_package_sets, BuildStats};
use crate::render::{FamilyLists, Manifest, ManifestRenderer};
use crate::GenerateError;
use buildgen_catalog::{load_catalog_file, TypeCatalog};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// In-memory result of one generator pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub manifest: Manifest,
    pub lists: FamilyLists,
    pub stats: BuildStats,
}

/// Summary of a file-to-file run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub stats: BuildStats,
    pub legacy: usize,
    pub current: usize,
    pub transport_schema: usize,
}

/// Classify the catalog and format one dependency list per family.
pub fn family_lists(catalog: &TypeCatalog, rules: &ClassificationRules) -> (FamilyLists, BuildStats) {
    let sets = build_package_sets(catalog, rules);
    let lists = FamilyLists {
        legacy: DependencyList::from_package_set(&sets.legacy),
        current: DependencyList::from_package_set(&sets.current),
        transport_schema: DependencyList::from_external(rules.transport_schema_targets()),
    };
    (lists, sets.stats)
}

pub fn generate_with(
    catalog: &TypeCatalog,
    rules: &ClassificationRules,
    renderer: &ManifestRenderer,
) -> Result<Generation, GenerateError> {
    let (lists, stats) = family_lists(catalog, rules);
    let manifest = renderer.render(&lists)?;
    Ok(Generation {
        manifest,
        lists,
        stats,
    })
}

/// Generate the manifest using the built-in rules.
pub fn generate(catalog: &TypeCatalog) -> Result<Generation, GenerateError> {
    generate_with(catalog, ClassificationRules::builtin(), &ManifestRenderer::new()?)
}

/// Atomically replace `dest` with the manifest contents.
///
/// The parent directory must already exist.
pub fn write_manifest(dest: &Path, manifest: &Manifest) -> Result<(), std::io::Error> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(manifest.as_bytes())?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    debug!("persisted {} bytes to {}", manifest.as_bytes().len(), dest.display());
    Ok(())
}

/// Load `catalog_path`, generate, and write the manifest to `output_path`.
pub fn generate_file(catalog_path: &Path, output_path: &Path) -> Result<GenerateReport, GenerateError> {
    let catalog = load_catalog_file(catalog_path).map_err(|source| GenerateError::CatalogRead {
        path: catalog_path.to_path_buf(),
        source,
    })?;
    info!(
        "loaded {} type descriptors from {}",
        catalog.len(),
        catalog_path.display()
    );

    let generation = generate(&catalog)?;
    let stats = generation.stats;
    if stats.missing_package > 0 || stats.unclassified > 0 {
        debug!(
            "skipped {} descriptors without a package and {} outside every family",
            stats.missing_package, stats.unclassified
        );
    }

    write_manifest(output_path, &generation.manifest).map_err(|source| {
        GenerateError::OutputWrite {
            path: output_path.to_path_buf(),
            source,
        }
    })?;

    let report = GenerateReport {
        output: output_path.to_path_buf(),
        stats,
        legacy: generation.lists.legacy.len(),
        current: generation.lists.current.len(),
        transport_schema: generation.lists.transport_schema.len(),
    };
    info!(
        "wrote {} (v2: {}, v3: {}, xds: {})",
        output_path.display(),
        report.legacy,
        report.current,
        report.transport_schema
    );
    Ok(report)
}
