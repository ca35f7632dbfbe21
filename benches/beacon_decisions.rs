//! Benchmarks for beacon decisions
//!
//! A decision is made for every fix, so both algorithms are measured over a
//! recorded-style sequence of one-second samples.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use prismtracker::LocationSample;
use prismtracker::beacon::{BeaconAlgorithm, IntervalBeacon, SmartBeacon};
use prismtracker::test_utils::moving_sample_at;
use std::hint::black_box;

const T0: i64 = 1_614_600_000;

/// One hour of one-second fixes: cruising, a slow turn, then stopped.
fn drive() -> Vec<LocationSample> {
    (0..3600)
        .map(|i| {
            let (course, speed) = match i {
                0..1200 => (90.0, 45.0),
                1200..2400 => (90.0 + (i - 1200) as f64 * 0.15, 20.0),
                _ => (270.0, 0.0),
            };
            moving_sample_at(T0 + i, course, speed)
        })
        .collect()
}

fn run(beacon: &mut dyn BeaconAlgorithm, samples: &[LocationSample]) -> usize {
    samples.iter().filter(|s| beacon.check(s)).count()
}

fn bench_decisions(c: &mut Criterion) {
    let samples = drive();

    let mut group = c.benchmark_group("beacon_decisions");
    group.throughput(Throughput::Elements(samples.len() as u64));

    group.bench_function("interval", |b| {
        b.iter(|| {
            let mut beacon = IntervalBeacon::new(600);
            run(&mut beacon, black_box(&samples))
        })
    });

    group.bench_function("smart", |b| {
        b.iter(|| {
            let mut beacon = SmartBeacon::new(30, 600);
            run(&mut beacon, black_box(&samples))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decisions);
criterion_main!(benches);
