use crate::classify::{ClassificationRules, VersionFamily};
use buildgen_catalog::{PackageName, TypeCatalog};
use std::collections::BTreeSet;
use tracing::debug;

/// Packages under this namespace are never build roots (e.g. annotations).
pub const EXCLUDED_NAMESPACE_PREFIX: &str = "envoy.annotations";

pub type PackageSet = BTreeSet<PackageName>;

/// Legacy and current package sets from one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSets {
    pub legacy: PackageSet,
    pub current: PackageSet,
    pub stats: BuildStats,
}

/// Descriptor accounting for a classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub descriptors: usize,
    pub missing_package: usize,
    pub excluded: usize,
    pub unclassified: usize,
}

impl PackageSets {
    pub fn get(&self, family: VersionFamily) -> Option<&PackageSet> {
        match family {
            VersionFamily::Legacy => Some(&self.legacy),
            VersionFamily::Current => Some(&self.current),
            VersionFamily::TransportSchema => None,
        }
    }
}

pub fn is_excluded(package: &str) -> bool {
    package.starts_with(EXCLUDED_NAMESPACE_PREFIX)
}

/// Classify every descriptor and collect the legacy and current sets.
///
/// The exclusion filter runs on the catalog package name, before any contrib
/// rewrite, so excluded packages are absent from every family.
pub fn build_package_sets(catalog: &TypeCatalog, rules: &ClassificationRules) -> PackageSets {
    let mut sets = PackageSets::default();

    for (type_name, descriptor) in catalog.descriptors() {
        sets.stats.descriptors += 1;

        let Some(package) = descriptor.package() else {
            debug!("dropping {type_name}: no qualified_package");
            sets.stats.missing_package += 1;
            continue;
        };
        if is_excluded(package) {
            debug!("excluding {type_name}: package {package} is not a build root");
            sets.stats.excluded += 1;
            continue;
        }

        let placements = rules.classify(descriptor);
        if placements.is_empty() {
            debug!("{type_name}: package {package} matches no version family");
            sets.stats.unclassified += 1;
            continue;
        }
        for placement in placements {
            match placement.family {
                VersionFamily::Legacy => sets.legacy.insert(placement.package),
                VersionFamily::Current => sets.current.insert(placement.package),
                VersionFamily::TransportSchema => false,
            };
        }
    }

    sets
}
