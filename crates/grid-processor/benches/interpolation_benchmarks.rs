//! Benchmarks for scattered-point interpolation and display alignment.
//!
//! Run with: cargo bench --package grid-processor --bench interpolation_benchmarks

use compare_common::{BoundingBox, Lattice};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::{align_geographic, DisplayLattice, InterpolatorConfig, TriangulatedField};
use pointset::{CoordinateFrame, PointSet, Sample};
use rand::Rng;

/// Random samples over the model domain with a smooth CAPE-like field.
fn generate_samples(count: usize) -> PointSet {
    let mut rng = rand::thread_rng();
    let samples: Vec<Sample> = (0..count)
        .map(|_| {
            let lon = rng.gen_range(14.1..23.9);
            let lat = rng.gen_range(49.1..54.9);
            let value = 1500.0 + 1000.0 * (lon * 0.3_f64).sin() * (lat * 0.5_f64).cos();
            Sample { lon, lat, value }
        })
        .collect();
    PointSet::from_samples(CoordinateFrame::Geographic, "CAPE", &samples).unwrap()
}

// =============================================================================
// TRIANGULATION BENCHMARKS
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulation_build");

    for count in [1_000, 10_000, 50_000] {
        let points = generate_samples(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                black_box(
                    TriangulatedField::build(points, "CAPE", &InterpolatorConfig::default())
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_to_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulation_to_grid");
    let field =
        TriangulatedField::build(&generate_samples(10_000), "CAPE", &InterpolatorConfig::default())
            .unwrap();

    for size in [100, 250, 500] {
        let lattice = Lattice::linspace((14.1, 23.9), (49.1, 54.9), (size, size)).unwrap();
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("serial", size), &lattice, |b, lattice| {
            b.iter(|| black_box(field.to_grid(lattice, false)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &lattice, |b, lattice| {
            b.iter(|| black_box(field.to_grid(lattice, true)));
        });
    }

    group.finish();
}

// =============================================================================
// ALIGNMENT BENCHMARKS
// =============================================================================

fn bench_align(c: &mut Criterion) {
    let field =
        TriangulatedField::build(&generate_samples(5_000), "CAPE", &InterpolatorConfig::default())
            .unwrap();
    let source = field.to_grid(
        &Lattice::linspace((14.1, 23.9), (49.1, 54.9), (500, 500)).unwrap(),
        true,
    );
    let bbox = BoundingBox::new(13.5, 48.75, 24.5, 55.25);
    let display = DisplayLattice::mercator(&bbox, 491, 291).unwrap();

    c.bench_function("align_geographic_491x291", |b| {
        b.iter(|| black_box(align_geographic(&source, &display).unwrap()));
    });
}

criterion_group!(benches, bench_build, bench_to_grid, bench_align);
criterion_main!(benches);
