//! Formatting of package sets into Bazel dependency references.

use crate::classify::ExternalTarget;
use crate::package_set::PackageSet;
use std::cmp::Ordering;

/// Target every API package directory exposes.
pub const PACKAGE_TARGET: &str = "pkg";

/// Sort key matching buildifier's ordering of label lists.
///
/// Buildifier orders a `:` ahead of every other label character, so the
/// colon is remapped to `!` before a byte-wise compare.
pub fn build_order_key(key: &str) -> String {
    key.replace(':', "!")
}

fn build_order(a: &str, b: &str) -> Ordering {
    build_order_key(a)
        .cmp(&build_order_key(b))
        .then_with(|| a.cmp(b))
}

/// `envoy.config.core.v3` -> `//envoy/config/core/v3:pkg`
pub fn package_reference(package: &str) -> String {
    format!("//{}:{PACKAGE_TARGET}", package.replace('.', "/"))
}

/// `xds.core.v3` in `com_github_cncf_udpa` -> `@com_github_cncf_udpa//xds/core/v3:pkg`
pub fn external_reference(target: &ExternalTarget) -> String {
    format!("@{}{}", target.repository, package_reference(target.package))
}

/// Ordered, deduplicated Bazel labels for one aggregation target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    references: Vec<String>,
}

impl DependencyList {
    /// Format in-repo packages. Order is by package name under
    /// [`build_order_key`], independent of input order.
    pub fn from_packages<'a, I>(packages: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&str> = packages.into_iter().collect();
        names.sort_by(|a, b| build_order(a, b));
        names.dedup();
        Self {
            references: names.into_iter().map(package_reference).collect(),
        }
    }

    pub fn from_package_set(set: &PackageSet) -> Self {
        Self::from_packages(set.iter().map(|pkg| pkg.as_str()))
    }

    pub fn from_external(targets: &[ExternalTarget]) -> Self {
        let mut sorted: Vec<&ExternalTarget> = targets.iter().collect();
        sorted.sort_by(|a, b| build_order(a.package, b.package).then_with(|| a.cmp(b)));
        sorted.dedup();
        Self {
            references: sorted.into_iter().map(external_reference).collect(),
        }
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
