//! Benchmarks for geo crate distance calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ecoroute_geo::{haversine_distance_meters, nearest, Coordinate};

fn create_fleet(count: usize, origin: &Coordinate) -> Vec<Coordinate> {
    (0..count)
        .map(|i| {
            // Spread points on a grid a few kilometers around the origin
            let north = (i as f64 * 37.0) % 4000.0 - 2000.0;
            let east = (i as f64 * 53.0) % 4000.0 - 2000.0;
            origin.offset_meters(north, east)
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let centro = Coordinate::new(-9.9300, -76.2425);
    let paucarbamba = Coordinate::new(-9.9365, -76.2400);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance_meters(black_box(&centro), black_box(&paucarbamba)))
    });
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    let home = Coordinate::new(-9.9300, -76.2425);

    for size in [12, 100, 1000, 10000].iter() {
        let fleet = create_fleet(*size, &home);

        group.bench_with_input(BenchmarkId::new("sequential", size), size, |b, _| {
            b.iter(|| nearest(black_box(&home), fleet.iter().copied()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_nearest);
criterion_main!(benches);
