//! Benchmarks for neighborhood enumeration and batch sampling.
//!
//! Run with: cargo bench --package climate-sampler
//! Or: cargo bench --package climate-sampler --bench sampling_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use climate_sampler::{
    points_within_distance, CellSize, GeoPoint, GridOrigin, LayerMetadata, MemoryLayerLoader,
    SamplerConfig, SamplingEngine,
};
use test_utils::create_gradient_grid;

const ROWS: usize = 360;
const COLS: usize = 720;

fn global_engine(parallel_threshold: usize) -> SamplingEngine<MemoryLayerLoader> {
    let metadata = LayerMetadata {
        origin: GridOrigin::new(90.0, -180.0),
        cell_size: CellSize::square(0.5),
        rows: ROWS,
        cols: COLS,
        nodata: Some(-9999.0),
    };
    let loader =
        MemoryLayerLoader::new().with_layer("bio1", metadata, create_gradient_grid(ROWS, COLS));
    let config = SamplerConfig {
        parallel_threshold,
        ..SamplerConfig::default()
    };
    SamplingEngine::with_loader(config, loader)
}

/// Points spread over the inhabited latitudes.
fn scattered_points(n: usize) -> Vec<GeoPoint> {
    (0..n)
        .map(|i| {
            let lat = -55.0 + (i * 37 % 1200) as f64 / 10.0;
            let lon = -179.0 + (i * 113 % 3580) as f64 / 10.0;
            GeoPoint::new(lat, lon)
        })
        .collect()
}

// =============================================================================
// NEIGHBORHOOD ENUMERATION
// =============================================================================

fn bench_neighborhood(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighborhood");
    let origin = GridOrigin::new(90.0, -180.0);
    let cell_size = CellSize::square(0.5);

    for radius in [40.0, 100.0, 500.0] {
        group.bench_with_input(
            BenchmarkId::new("equator", radius as u64),
            &radius,
            |b, &radius| {
                b.iter(|| {
                    points_within_distance(
                        black_box(GeoPoint::new(0.3, 10.2)),
                        radius,
                        origin,
                        cell_size,
                    )
                })
            },
        );
    }

    // Windows widen toward the poles.
    group.bench_function("near_pole_100", |b| {
        b.iter(|| {
            points_within_distance(
                black_box(GeoPoint::new(88.9, 10.2)),
                100.0,
                origin,
                cell_size,
            )
        })
    });

    group.finish();
}

// =============================================================================
// BATCH SAMPLING
// =============================================================================

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling");
    let points = scattered_points(1000);
    group.throughput(Throughput::Elements(points.len() as u64));

    let sequential = global_engine(usize::MAX);
    let parallel = global_engine(256);
    // Load outside the measurement.
    sequential.layer("bio1").unwrap();
    parallel.layer("bio1").unwrap();

    group.bench_function("value_1000", |b| {
        b.iter(|| sequential.sample_value("bio1", black_box(&points)))
    });

    group.bench_function("average_40km_1000_sequential", |b| {
        b.iter(|| sequential.sample_average("bio1", black_box(&points), 40.0))
    });

    group.bench_function("average_40km_1000_parallel", |b| {
        b.iter(|| parallel.sample_average("bio1", black_box(&points), 40.0))
    });

    group.bench_function("variance_100km_1000_parallel", |b| {
        b.iter(|| parallel.sample_variance("bio1", black_box(&points), 100.0))
    });

    group.finish();
}

criterion_group!(benches, bench_neighborhood, bench_sampling);

criterion_main!(benches);
