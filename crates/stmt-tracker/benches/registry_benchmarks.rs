//! Performance benchmarks for statement tracking
//!
//! Measures handle forwarding overhead, open/close throughput and reclaim cost.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use stmt_tracker::testing::{MockConnection, MockProbe, MockStatement};
use stmt_tracker::{PooledConnection, Statement, StatementRegistry, TrackerConfig};

fn bench_forwarding_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("forwarding_overhead");
    let probe = MockProbe::default();

    // Driver statement called directly
    let mut direct = MockStatement::new(&probe);
    group.bench_function("direct_execute_query", |b| {
        b.iter(|| black_box(direct.execute_query(black_box("SELECT 1")).unwrap()));
    });

    // Same call through a tracked handle
    let registry = StatementRegistry::new();
    let mut handle = registry.register(MockStatement::new(&probe));
    group.bench_function("handle_execute_query", |b| {
        b.iter(|| black_box(handle.execute_query(black_box("SELECT 1")).unwrap()));
    });

    group.bench_function("handle_fetch_size", |b| {
        b.iter(|| black_box(handle.fetch_size().unwrap()));
    });

    group.finish();
}

fn bench_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_close");
    let probe = MockProbe::default();
    let conn = PooledConnection::new(MockConnection::new(&probe), TrackerConfig::default());

    group.throughput(Throughput::Elements(1));
    group.bench_function("open_then_close", |b| {
        b.iter(|| {
            let mut stmt = conn.open_statement().unwrap();
            stmt.close().unwrap();
        });
    });

    group.bench_function("open_then_drop", |b| {
        b.iter(|| drop(black_box(conn.open_statement().unwrap())));
    });

    group.finish();
}

fn bench_reclaim(c: &mut Criterion) {
    let mut group = c.benchmark_group("reclaim");
    let config = TrackerConfig {
        warn_on_leak: false,
        ..TrackerConfig::default()
    };

    for leaked in [0usize, 10, 100, 1_000] {
        group.throughput(Throughput::Elements(leaked as u64));
        group.bench_with_input(BenchmarkId::from_parameter(leaked), &leaked, |b, &n| {
            let probe = MockProbe::default();
            let conn = PooledConnection::new(MockConnection::new(&probe), config);
            b.iter_batched(
                || {
                    (0..n)
                        .map(|_| conn.open_statement().unwrap())
                        .collect::<Vec<_>>()
                },
                |handles| {
                    let report = conn.reclaim();
                    black_box(report.leak_count());
                    handles
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_concurrent_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_open_close");
    let probe = MockProbe::default();
    let conn = PooledConnection::new(MockConnection::new(&probe), TrackerConfig::default());

    for threads in [1usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    std::thread::scope(|scope| {
                        for _ in 0..threads {
                            scope.spawn(|| {
                                for _ in 0..100 {
                                    let mut stmt = conn.open_statement().unwrap();
                                    stmt.close().unwrap();
                                }
                            });
                        }
                    });
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_forwarding_overhead,
    bench_open_close,
    bench_reclaim,
    bench_concurrent_open_close,
);
criterion_main!(benches);
