//! Benchmarks for procedural generation and per-tick CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use astrarium::gravity::GravitySim;
use astrarium::structure::{DetailLevel, Structure, StructureConfig, StructureKind};

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for kind in [
        StructureKind::Spiral,
        StructureKind::BarredSpiral,
        StructureKind::Elliptical,
        StructureKind::Irregular,
    ] {
        for (label, detail) in [
            ("overview", DetailLevel::Overview),
            ("detail", DetailLevel::Detail),
        ] {
            let config = StructureConfig {
                kind,
                particle_count: 20_000,
                detail,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", kind), label),
                &config,
                |b, config| b.iter(|| black_box(Structure::generate("bench", config))),
            );
        }
    }

    group.finish();
}

fn bench_gravity_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("gravity_step");

    for count in [5_000u32, 20_000] {
        let config = StructureConfig {
            particle_count: count,
            ..Default::default()
        };
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let mut structure = Structure::generate("bench", &config);
            let mut sim = GravitySim::for_field(structure.field().unwrap());
            b.iter(|| {
                let field = structure.field_mut().unwrap();
                sim.step(field, 1.0 / 60.0);
                black_box(field.magnitudes()[0])
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generation, bench_gravity_step);
criterion_main!(benches);
