//! Benchmarks for the renderer crate - colorization, lookup tables and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use compare_common::{Grid, Lattice};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use renderer::{colorize, encode_png, palettes, ColorMap, Normalize};

/// CAPE-like field with noise and a no-data border.
fn generate_grid(width: usize, height: usize) -> Grid {
    let mut rng = rand::thread_rng();
    let lattice = Lattice::linspace((14.1, 23.9), (49.1, 54.9), (width, height)).unwrap();
    Grid::from_fn(lattice, |lon, lat| {
        if lon < 14.5 || lat > 54.5 {
            return None;
        }
        let base = 2000.0 + 1500.0 * (lon * 0.7).sin() * (lat * 0.4).cos();
        Some(base + rng.gen_range(-50.0..50.0))
    })
}

// =============================================================================
// COLOR MAP BENCHMARKS
// =============================================================================

fn bench_lut(c: &mut Criterion) {
    let palette = palettes::radar_reflectivity();
    let map = ColorMap::from_palette(&palette).unwrap();

    c.bench_function("to_lut_256", |b| {
        b.iter(|| black_box(map.to_lut(256).unwrap()));
    });
    c.bench_function("sample_direct", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(map.sample(i as f64 / 1000.0));
            }
        });
    });
}

fn bench_colorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorize");
    let (map, _) = palettes::load(&palettes::pivotal_cape()).unwrap();
    let lut = map.to_lut(256).unwrap();
    let norm = Normalize::new(0.0, 4000.0).unwrap();

    for (w, h) in [(491, 291), (1000, 600)] {
        let grid = generate_grid(w, h);
        group.throughput(Throughput::Elements((w * h) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", w, h)),
            &grid,
            |b, grid| b.iter(|| black_box(colorize(grid, &lut, &norm))),
        );
    }

    group.finish();
}

// =============================================================================
// PNG BENCHMARKS
// =============================================================================

fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encode");
    let (map, _) = palettes::load(&palettes::pivotal_cape()).unwrap();
    let lut = map.to_lut(256).unwrap();

    let indexed = colorize(
        &generate_grid(491, 291),
        &lut,
        &Normalize::new(0.0, 4000.0).unwrap().with_levels(100).unwrap(),
    );
    group.bench_function("indexed_491x291", |b| {
        b.iter(|| black_box(encode_png(&indexed).unwrap()))
    });

    // A 4096-entry table over random values yields more than 256 colors
    let mut rng = rand::thread_rng();
    let random = Grid::from_fn(
        Lattice::linspace((0.0, 1.0), (0.0, 1.0), (256, 256)).unwrap(),
        |_, _| Some(rng.gen_range(0.0..1.0)),
    );
    let ramp = ColorMap::from_palette(&palettes::meteologix_precipitation()).unwrap();
    let noisy = colorize(
        &random,
        &ramp.to_lut(4096).unwrap(),
        &Normalize::new(0.0, 1.0).unwrap(),
    );
    group.bench_function("rgba_256x256", |b| {
        b.iter(|| black_box(encode_png(&noisy).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_lut, bench_colorize, bench_png);
criterion_main!(benches);
