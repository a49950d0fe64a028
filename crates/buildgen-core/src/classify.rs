//! Version family classification for API packages.
//!
//! Classification is an ordered list of (pattern, family) rules with a
//! constant override set consulted first. The current-family rule sits ahead
//! of every legacy rule, so a package that looks current is never also legacy
//! unless it is listed as an override.

use buildgen_catalog::{PackageName, TypeDescriptor};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::trace;

/// Packages matching this pattern belong to the current (v3) family.
pub const CURRENT_PATTERN: &str = r"envoy[\w\.]*\.(v3alpha|v3)";

/// Legacy (v2) patterns, in evaluation order.
pub const LEGACY_PATTERNS: &[&str] = &[
    r"envoy[\w\.]*\.(v1alpha\d?|v1)",
    r"envoy[\w\.]*\.(v2alpha\d?|v2)",
    r"envoy\.type\.matcher$",
    r"envoy\.type$",
    r"envoy\.config\.cluster\.redis",
    r"envoy\.config\.retry\.previous_priorities",
];

// These stayed on v2 because the v2 and v3 shapes were identical, then were
// upgraded later. Both variants remain part of the v3 API.
pub const DUAL_MEMBERSHIP_PACKAGES: &[&str] = &[
    "envoy.config.filter.thrift.router.v2alpha1",
    "envoy.config.health_checker.redis.v2",
    "envoy.config.resource_monitor.fixed_heap.v2alpha",
    "envoy.config.resource_monitor.injected_resource.v2alpha",
    "envoy.config.retry.omit_canary_hosts.v2",
    "envoy.config.retry.previous_hosts.v2",
];

/// Proto files under this directory carry the standard namespace but build
/// from the contrib tree.
pub const CONTRIB_PROTO_PREFIX: &str = "contrib/";
pub const CONTRIB_NAMESPACE: &str = "contrib";

/// External xds packages that make up the transport-schema family.
pub const TRANSPORT_SCHEMA_TARGETS: &[ExternalTarget] = &[
    ExternalTarget::new("com_github_cncf_udpa", "xds.core.v3"),
    ExternalTarget::new("com_github_cncf_udpa", "xds.type.matcher.v3"),
    ExternalTarget::new("com_github_cncf_udpa", "xds.type.v3"),
];

static BUILTIN_RULES: LazyLock<ClassificationRules> = LazyLock::new(|| {
    ClassificationRules::new(
        CURRENT_PATTERN,
        LEGACY_PATTERNS,
        DUAL_MEMBERSHIP_PACKAGES,
        CONTRIB_PROTO_PREFIX,
    )
    .expect("built-in classification patterns compile")
});

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid classification pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Build-target family a package can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionFamily {
    Legacy,
    Current,
    TransportSchema,
}

impl VersionFamily {
    pub const ALL: [VersionFamily; 3] = [
        VersionFamily::Legacy,
        VersionFamily::Current,
        VersionFamily::TransportSchema,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VersionFamily::Legacy => "v2",
            VersionFamily::Current => "v3",
            VersionFamily::TransportSchema => "xds",
        }
    }

    /// Name of the aggregation target declared for this family.
    pub fn target_name(self) -> &'static str {
        match self {
            VersionFamily::Legacy => "v2_protos",
            VersionFamily::Current => "v3_protos",
            VersionFamily::TransportSchema => "xds_protos",
        }
    }
}

impl fmt::Display for VersionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package living in another Bazel repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExternalTarget {
    pub repository: &'static str,
    pub package: &'static str,
}

impl ExternalTarget {
    pub const fn new(repository: &'static str, package: &'static str) -> Self {
        Self {
            repository,
            package,
        }
    }
}

/// One family assignment produced for a descriptor.
///
/// `package` may differ from the descriptor's own package when the contrib
/// rewrite applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub family: VersionFamily,
    pub package: PackageName,
}

#[derive(Debug)]
struct Rule {
    family: VersionFamily,
    pattern: Regex,
}

#[derive(Debug)]
pub struct ClassificationRules {
    rules: Vec<Rule>,
    overrides: BTreeMap<String, BTreeSet<VersionFamily>>,
    contrib_prefix: String,
}

impl ClassificationRules {
    /// The compiled-in rule set, built once per process.
    pub fn builtin() -> &'static ClassificationRules {
        &BUILTIN_RULES
    }

    /// Compile a rule set. Patterns are anchored at the start of the package
    /// name; `$` is needed to anchor the end.
    pub fn new(
        current_pattern: &str,
        legacy_patterns: &[&str],
        dual_membership: &[&str],
        contrib_prefix: &str,
    ) -> Result<Self, RuleError> {
        let mut rules = Vec::with_capacity(legacy_patterns.len() + 1);
        rules.push(Rule {
            family: VersionFamily::Current,
            pattern: compile_anchored(current_pattern)?,
        });
        for pattern in legacy_patterns {
            rules.push(Rule {
                family: VersionFamily::Legacy,
                pattern: compile_anchored(pattern)?,
            });
        }

        let both: BTreeSet<VersionFamily> = [VersionFamily::Legacy, VersionFamily::Current]
            .into_iter()
            .collect();
        let overrides = dual_membership
            .iter()
            .map(|pkg| ((*pkg).to_owned(), both.clone()))
            .collect();

        Ok(Self {
            rules,
            overrides,
            contrib_prefix: contrib_prefix.to_owned(),
        })
    }

    /// Families a package belongs to: empty, one, or (for overrides) two.
    pub fn families(&self, package: &str) -> BTreeSet<VersionFamily> {
        if let Some(families) = self.overrides.get(package) {
            return families.clone();
        }
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(package))
            .map(|rule| BTreeSet::from([rule.family]))
            .unwrap_or_default()
    }

    pub fn is_dual_membership(&self, package: &str) -> bool {
        self.overrides.contains_key(package)
    }

    /// Place a descriptor into families, applying the contrib rewrite to
    /// pattern-matched current packages. Descriptors without a package yield
    /// nothing.
    pub fn classify(&self, descriptor: &TypeDescriptor) -> Vec<Placement> {
        let Some(package) = descriptor.package() else {
            return Vec::new();
        };
        let overridden = self.is_dual_membership(package);
        let placements: Vec<Placement> = self
            .families(package)
            .into_iter()
            .map(|family| {
                let package = if family == VersionFamily::Current
                    && !overridden
                    && descriptor.proto_path_str().starts_with(&self.contrib_prefix)
                {
                    package.nested_under(CONTRIB_NAMESPACE)
                } else {
                    package.clone()
                };
                Placement { family, package }
            })
            .collect();
        for placement in &placements {
            trace!("{} -> {}", placement.package, placement.family);
        }
        placements
    }

    /// The transport-schema family is fixed, not derived from the catalog.
    pub fn transport_schema_targets(&self) -> &'static [ExternalTarget] {
        TRANSPORT_SCHEMA_TARGETS
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn families(pkg: &str) -> Vec<VersionFamily> {
        ClassificationRules::builtin()
            .families(pkg)
            .into_iter()
            .collect()
    }

    #[test]
    fn current_packages_are_current_only() {
        assert_eq!(families("envoy.config.cluster.v3"), [VersionFamily::Current]);
        assert_eq!(
            families("envoy.extensions.filters.http.router.v3"),
            [VersionFamily::Current]
        );
        assert_eq!(families("envoy.service.tap.v3alpha"), [VersionFamily::Current]);
    }

    #[test]
    fn legacy_packages_are_legacy_only() {
        assert_eq!(families("envoy.api.v2"), [VersionFamily::Legacy]);
        assert_eq!(families("envoy.api.v2.core"), [VersionFamily::Legacy]);
        assert_eq!(families("envoy.type.v1alpha"), [VersionFamily::Legacy]);
        assert_eq!(families("envoy.config.filter.http.ext_authz.v2alpha1"), [VersionFamily::Legacy]);
        assert_eq!(families("envoy.config.trace.v1"), [VersionFamily::Legacy]);
    }

    #[test]
    fn unversioned_legacy_packages_match_literal_rules() {
        assert_eq!(families("envoy.type"), [VersionFamily::Legacy]);
        assert_eq!(families("envoy.type.matcher"), [VersionFamily::Legacy]);
        assert_eq!(families("envoy.config.cluster.redis"), [VersionFamily::Legacy]);
        assert_eq!(
            families("envoy.config.retry.previous_priorities"),
            [VersionFamily::Legacy]
        );
    }

    #[test]
    fn end_anchored_rules_do_not_match_longer_names() {
        assert!(families("envoy.type.tracing").is_empty());
        assert!(families("envoy.type.matcher.extra").is_empty());
    }

    #[test]
    fn current_rule_short_circuits_legacy() {
        // Matches both `v2` and `v3` patterns; current wins.
        assert_eq!(families("envoy.api.v2.foo.v3"), [VersionFamily::Current]);
    }

    #[test]
    fn matching_is_anchored_at_start() {
        assert!(families("contrib.envoy.config.cluster.v3").is_empty());
        assert!(families("xds.core.v3").is_empty());
    }

    #[test]
    fn dual_membership_packages_get_both_families() {
        for pkg in DUAL_MEMBERSHIP_PACKAGES {
            assert_eq!(
                families(pkg),
                [VersionFamily::Legacy, VersionFamily::Current],
                "{pkg}"
            );
        }
    }

    #[test]
    fn unmatched_packages_have_no_family() {
        assert!(families("google.protobuf").is_empty());
        assert!(families("udpa.annotations").is_empty());
        assert!(families("envoy.annotations").is_empty());
    }

    #[test]
    fn contrib_rewrite_applies_to_current_only() {
        let rules = ClassificationRules::builtin();
        let desc = TypeDescriptor::new(
            "envoy.extensions.filters.network.kafka_broker.v3",
            "contrib/envoy/extensions/filters/network/kafka_broker/v3/kafka_broker.proto",
        );
        assert_eq!(
            rules.classify(&desc),
            [Placement {
                family: VersionFamily::Current,
                package: PackageName::from("contrib.envoy.extensions.filters.network.kafka_broker.v3"),
            }]
        );

        let legacy = TypeDescriptor::new("envoy.config.filter.v2", "contrib/envoy/config/filter.proto");
        assert_eq!(
            rules.classify(&legacy),
            [Placement {
                family: VersionFamily::Legacy,
                package: PackageName::from("envoy.config.filter.v2"),
            }]
        );
    }

    #[test]
    fn non_contrib_current_keeps_name() {
        let desc = TypeDescriptor::new("envoy.config.core.v3", "envoy/config/core/v3/base.proto");
        let placements = ClassificationRules::builtin().classify(&desc);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].package, "envoy.config.core.v3");
    }

    #[test]
    fn descriptor_without_package_is_dropped() {
        let desc = TypeDescriptor {
            qualified_package: None,
            proto_path: None,
        };
        assert!(ClassificationRules::builtin().classify(&desc).is_empty());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = ClassificationRules::new("envoy.(v3", &[], &[], "contrib/").unwrap_err();
        assert!(err.to_string().contains("envoy.(v3"));
    }

    #[test]
    fn custom_rules_respect_order() {
        let rules = ClassificationRules::new(r"acme\.\w+\.v2", &[r"acme\."], &[], "contrib/").unwrap();
        assert_eq!(
            rules.families("acme.core.v2").into_iter().collect::<Vec<_>>(),
            [VersionFamily::Current]
        );
        assert_eq!(
            rules.families("acme.core.v1").into_iter().collect::<Vec<_>>(),
            [VersionFamily::Legacy]
        );
    }

    #[test]
    fn transport_schema_targets_are_fixed() {
        let targets = ClassificationRules::builtin().transport_schema_targets();
        assert_eq!(targets.len(), 3);
        assert!(targets.iter().all(|t| t.repository == "com_github_cncf_udpa"));
        assert_eq!(VersionFamily::TransportSchema.target_name(), "xds_protos");
    }
}
