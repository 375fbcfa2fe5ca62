//! # Stage Benchmarks
//!
//! Performance benchmarks for banner injection and rule routing.
//!
//! Run with: `cargo bench -p bannerline-core`

use bannerline_core::{
    BannerInjectionStage, Pipeline, RuleSpec, SourceUnit, StageRegistry, TextTransform,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Build a source text of roughly `size` bytes.
fn source_of_size(size: usize) -> String {
    let line = "export const value = compute(input, options);\n";
    line.repeat(size / line.len() + 1)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_banner_injection(c: &mut Criterion) {
    let mut group = c.benchmark_group("banner_injection");
    let stage = BannerInjectionStage::new();

    for size in [1_000, 100_000, 10_000_000].iter() {
        let source = source_of_size(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| black_box(stage.transform(black_box(source))));
        });
    }

    group.finish();
}

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    let registry = StageRegistry::with_builtins();

    for rules in [1usize, 10, 50].iter() {
        let specs: Vec<RuleSpec> = (0..*rules)
            .map(|i| RuleSpec::new(format!(r"^pkg{i}/.*\.[jt]sx?$"), ["banner"]))
            .collect();
        let pipeline = Pipeline::from_specs(&specs, &registry).expect("build");
        let unit = SourceUnit::new("pkg0/src/index.ts", source_of_size(1_000));

        group.bench_with_input(BenchmarkId::from_parameter(rules), &unit, |b, unit| {
            b.iter(|| black_box(pipeline.process(black_box(unit))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_banner_injection, bench_routing);
criterion_main!(benches);
