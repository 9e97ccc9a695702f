//! Synthetic access-pattern benchmarks, grounded in the same phases
//! the teacher's own benchmark module exercised: sequential access,
//! random access, a chunk shared read-only across cores, and a
//! false-sharing pattern where every core hammers the same line.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use moesi_sim::address::Address;
use moesi_sim::run_with_trace;
use moesi_sim::trace::{FileTraceSource, Record, RecordKind};
use moesi_sim::SimConfig;

const LINE_SIZE: u32 = 32;
const OPS_PER_CORE: u32 = 2_000;

fn sequential_trace(num_cores: usize) -> Arc<FileTraceSource> {
    let per_pid = (0..num_cores)
        .map(|pid| {
            (0..OPS_PER_CORE)
                .map(|i| Record {
                    kind: RecordKind::Read,
                    addr: Address((pid as u32 * OPS_PER_CORE + i) * LINE_SIZE),
                })
                .collect()
        })
        .collect();
    Arc::new(FileTraceSource::from_records(per_pid))
}

fn random_trace(num_cores: usize) -> Arc<FileTraceSource> {
    let mut rng = rand::thread_rng();
    let per_pid = (0..num_cores)
        .map(|_| {
            (0..OPS_PER_CORE)
                .map(|_| Record {
                    kind: if rng.gen_bool(0.5) {
                        RecordKind::Read
                    } else {
                        RecordKind::Write
                    },
                    addr: Address(rng.gen_range(0..OPS_PER_CORE * LINE_SIZE)),
                })
                .collect()
        })
        .collect();
    Arc::new(FileTraceSource::from_records(per_pid))
}

/// Every core reads the same chunk of lines repeatedly: exercises the
/// Shared/Owner fan-out path without ever forcing an invalidation.
fn shared_read_trace(num_cores: usize) -> Arc<FileTraceSource> {
    let per_pid = (0..num_cores)
        .map(|_| {
            (0..OPS_PER_CORE)
                .map(|i| Record {
                    kind: RecordKind::Read,
                    addr: Address((i % 64) * LINE_SIZE),
                })
                .collect()
        })
        .collect();
    Arc::new(FileTraceSource::from_records(per_pid))
}

/// Every core writes the exact same line: worst case for the bus,
/// forcing a BusUpgr/BusRdX round trip on almost every access.
fn false_sharing_trace(num_cores: usize) -> Arc<FileTraceSource> {
    let per_pid = (0..num_cores)
        .map(|_| {
            (0..OPS_PER_CORE)
                .map(|_| Record {
                    kind: RecordKind::Write,
                    addr: Address(0),
                })
                .collect()
        })
        .collect();
    Arc::new(FileTraceSource::from_records(per_pid))
}

fn bench_pattern(c: &mut Criterion, name: &str, make_trace: fn(usize) -> Arc<FileTraceSource>) {
    let mut group = c.benchmark_group(name);
    for num_cores in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(num_cores), &num_cores, |b, &num_cores| {
            b.iter_batched(
                || make_trace(num_cores),
                |trace| run_with_trace(SimConfig::default(), trace).unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn sequential(c: &mut Criterion) {
    bench_pattern(c, "sequential", sequential_trace);
}

fn random(c: &mut Criterion) {
    bench_pattern(c, "random", random_trace);
}

fn shared_read(c: &mut Criterion) {
    bench_pattern(c, "shared_read", shared_read_trace);
}

fn false_sharing(c: &mut Criterion) {
    bench_pattern(c, "false_sharing", false_sharing_trace);
}

criterion_group!(benches, sequential, random, shared_read, false_sharing);
criterion_main!(benches);
