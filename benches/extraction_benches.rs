use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hypertile::{extract_rgb_composite, ClassPalette, TileCollection, TileLayout};
use ndarray::{Array2, ArrayD, IxDyn};

const TILE_SIZES: [usize; 3] = [32, 128, 512];
const CHANNELS: usize = 54;
const BANDS: [usize; 3] = [25, 15, 5];

fn run_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("Extraction");
    bench_composite(&mut group);
    bench_curve(&mut group);
    bench_palette(&mut group);
    group.finish();
}

fn bench_composite(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    for size in TILE_SIZES {
        let imagery = ArrayD::from_elem(IxDyn(&[2, CHANNELS, size, size]), 1500.0_f32);

        group.throughput(criterion::Throughput::Elements((size * size) as u64));
        group.bench_function(BenchmarkId::new("composite", size), |b| {
            b.iter(|| {
                extract_rgb_composite(&imagery, 1, BANDS, TileLayout::Spatial)
                    .expect("bands to be in range")
            });
        });
    }
}

fn bench_curve(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    for size in TILE_SIZES {
        let tiles = TileCollection::new(
            ArrayD::from_elem(IxDyn(&[size, 2, 4, CHANNELS]), 1500.0_f32),
            ArrayD::from_elem(IxDyn(&[size, 1, 1, 1]), 3_i64),
        )
        .expect("tile counts to match");

        group.throughput(criterion::Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("curve", size), |b| {
            b.iter(|| {
                for tile_index in 0..size {
                    tiles
                        .resolve_spectral_curve(tile_index)
                        .expect("tile index to be in range");
                }
            });
        });
    }
}

fn bench_palette(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    let palette = ClassPalette::default();
    for size in TILE_SIZES {
        let raster = Array2::from_shape_fn((size, size), |(row, col)| ((row + col) % 10) as i64);

        group.throughput(criterion::Throughput::Elements((size * size) as u64));
        group.bench_function(BenchmarkId::new("palette", size), |b| {
            b.iter(|| palette.class_palette_for(&raster).expect("labels to fit palette"));
        });
    }
}

criterion_group! {name = benches;
config = Criterion::default().measurement_time(Duration::from_secs(10));
targets=run_benches}
criterion_main!(benches);
