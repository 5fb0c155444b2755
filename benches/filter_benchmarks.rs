//! Benchmarks for pitch filter performance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use head_tilt_control::filters::{
    exponential::ExponentialFilter, median::MedianFilter, moving_average::MovingAverageFilter,
    NoFilter, PitchFilter,
};

fn benchmark_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    // Test data - a nodding head with deterministic jitter
    let test_data: Vec<f64> = (0..100)
        .map(|i| {
            let t = f64::from(i) * 0.1;
            let noise = f64::from((i * 17) % 11) / 11.0 - 0.5;
            10.0 * t.sin() + noise
        })
        .collect();

    let filter_configs: Vec<(&str, Box<dyn PitchFilter>)> = vec![
        ("no_filter", Box::new(NoFilter)),
        ("moving_average_5", Box::new(MovingAverageFilter::new(5).unwrap())),
        ("moving_average_10", Box::new(MovingAverageFilter::new(10).unwrap())),
        ("median_5", Box::new(MedianFilter::new(5).unwrap())),
        ("median_9", Box::new(MedianFilter::new(9).unwrap())),
        ("exponential_0.5", Box::new(ExponentialFilter::new(0.5).unwrap())),
        ("exponential_0.8", Box::new(ExponentialFilter::new(0.8).unwrap())),
    ];

    for (name, mut filter) in filter_configs {
        group.bench_with_input(BenchmarkId::new("single_update", name), &test_data[0], |b, &pitch| {
            b.iter(|| black_box(filter.apply(black_box(pitch))));
        });

        group.bench_with_input(BenchmarkId::new("sequence_100", name), &test_data, |b, data| {
            b.iter(|| {
                filter.reset();
                for &pitch in data {
                    black_box(filter.apply(black_box(pitch)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_median_sorting(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_sorting");

    for window_size in [3_usize, 5, 9, 15] {
        let mut median = MedianFilter::new(window_size).unwrap();

        let id = BenchmarkId::new("window_size", window_size);
        group.bench_with_input(id, &window_size, |b, &size| {
            b.iter(|| {
                median.reset();
                for i in 0..size {
                    black_box(median.apply(black_box(i as f64)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_filters, benchmark_median_sorting);
criterion_main!(benches);
