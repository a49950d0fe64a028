use buildgen_catalog::{TypeCatalog, TypeDescriptor};
use buildgen_core::{family_lists, generate, ClassificationRules, DependencyList};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

// Roughly the shape of the real type database: many types per package, a mix
// of v2, v3, contrib, and unversioned packages.
fn synthetic_catalog(packages: usize, types_per_package: usize) -> TypeCatalog {
    let mut entries = Vec::with_capacity(packages * types_per_package);
    for p in 0..packages {
        let (pkg, path) = match p % 4 {
            0 => (
                format!("envoy.config.area{p}.v2"),
                format!("envoy/config/area{p}/v2/area.proto"),
            ),
            1 => (
                format!("envoy.extensions.area{p}.v3"),
                format!("envoy/extensions/area{p}/v3/area.proto"),
            ),
            2 => (
                format!("envoy.extensions.area{p}.v3"),
                format!("contrib/envoy/extensions/area{p}/v3/area.proto"),
            ),
            _ => (
                format!("google.area{p}"),
                format!("google/area{p}/area.proto"),
            ),
        };
        for t in 0..types_per_package {
            entries.push((
                format!("{pkg}.Type{t}"),
                TypeDescriptor::new(pkg.as_str(), path.as_str()),
            ));
        }
    }
    TypeCatalog::from_descriptors(entries)
}

fn bench_classify(c: &mut Criterion) {
    let catalog = synthetic_catalog(1000, 3);
    let rules = ClassificationRules::builtin();
    c.bench_function("family_lists_3000_types", |b| {
        b.iter(|| family_lists(black_box(&catalog), rules));
    });
}

fn bench_generate(c: &mut Criterion) {
    let catalog = synthetic_catalog(1000, 3);
    c.bench_function("generate_3000_types", |b| {
        b.iter(|| generate(black_box(&catalog)).unwrap());
    });
}

fn bench_format(c: &mut Criterion) {
    let names: Vec<String> = (0..2000)
        .rev()
        .map(|i| format!("envoy.extensions.filters.http.f{i}.v3"))
        .collect();
    c.bench_function("dependency_list_2000_packages", |b| {
        b.iter(|| DependencyList::from_packages(black_box(&names).iter().map(String::as_str)));
    });
}

criterion_group!(benches, bench_classify, bench_generate, bench_format);
criterion_main!(benches);
