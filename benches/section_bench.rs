//! Benchmarks for the section property pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use section_solver::prelude::*;

fn benchmark_pipe(c: &mut Criterion) {
    let geometry = CrossSectionGeometry::pipe(0.1683, 0.00711);
    let options = EngineOptions::default().with_divisions(32);
    c.bench_function("pipe_32_divisions", |b| {
        b.iter(|| {
            let analysis = update_properties(&geometry, 0.3, ElementType::Pipe1, &options).unwrap();
            black_box(analysis);
        })
    });
}

fn benchmark_i_profile(c: &mut Criterion) {
    let geometry = CrossSectionGeometry::i_profile(0.3, 0.15, 0.0107, 0.0071);
    let options = EngineOptions::default().with_subdivisions(2);
    c.bench_function("i_profile_2_subdivisions", |b| {
        b.iter(|| {
            let analysis = update_properties(&geometry, 0.3, ElementType::Beam1, &options).unwrap();
            black_box(analysis);
        })
    });
}

fn benchmark_batch(c: &mut Criterion) {
    let requests: Vec<SectionRequest> = (1..=8)
        .map(|i| {
            let diameter = 0.05 * i as f64;
            SectionRequest::new(
                CrossSectionGeometry::pipe(diameter, diameter / 20.0),
                0.3,
                ElementType::Pipe1,
            )
            .with_options(EngineOptions::default().with_divisions(16))
        })
        .collect();
    c.bench_function("batch_8_pipes", |b| {
        b.iter(|| {
            let results = compute_all(&requests);
            black_box(results);
        })
    });
}

criterion_group!(benches, benchmark_pipe, benchmark_i_profile, benchmark_batch);

criterion_main!(benches);
