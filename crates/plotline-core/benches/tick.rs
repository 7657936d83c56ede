//! Tick throughput over synthetic snapshot streams.
//!
//! Each tier fixes a key cardinality; every tick perturbs one key so the
//! hot path (diff + single-key delta) dominates, with a forced full
//! snapshot landing once per simulated second.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use plotline_core::{Compactor, CompactorConfig, Snapshot, Value};

const TIERS: [usize; 3] = [8, 64, 512];
const TICKS: usize = 1_000;

fn base_snapshot(keys: usize) -> Snapshot {
    (0..keys)
        .map(|i| (format!("k{i:04}"), Value::Float(0.0)))
        .collect()
}

fn run_stream(keys: usize) -> usize {
    let mut compactor = Compactor::new(&CompactorConfig::default());
    let mut snapshot = base_snapshot(keys);
    let mut emitted = 0;

    for tick in 0..TICKS {
        let now = tick as f64 * 0.05;
        let key = format!("k{:04}", tick % keys);
        snapshot.insert(key, Value::Float(tick as f64));

        let emission = compactor
            .tick(now, &snapshot)
            .expect("bench stream is monotonic");
        emitted += emission.records().count();
    }

    emitted
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("compactor.tick");

    for keys in TIERS {
        group.throughput(Throughput::Elements(TICKS as u64));
        group.bench_with_input(BenchmarkId::new("stream", keys), &keys, |b, &keys| {
            b.iter(|| black_box(run_stream(keys)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
