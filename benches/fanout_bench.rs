//! # Fan-out Benchmarks
//!
//! Leaf, chain and fan-out graphs rooted at a counter emitting 1000 records,
//! with in-process echo units and with `cat` processes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use the_pipetree::backends::local::{CounterUnit, EchoUnit};
use the_pipetree::engine::Node;
use the_pipetree::streams::{RecordSink, RecordSource};
use the_pipetree::traits::Unit;

const RECORDS: u64 = 1000;

fn echo() -> Arc<dyn Unit> {
    Arc::new(EchoUnit::new())
}

#[cfg(unix)]
fn cat() -> Arc<dyn Unit> {
    Arc::new(the_pipetree::backends::process::ProcessUnit::new("cat"))
}

/// Runs `root` on a fresh current-thread runtime, discarding its output.
fn run_sync(root: &Node) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        let (output, collected) = RecordSink::collector(100);
        let (errors, _) = RecordSink::collector(100);
        root
            .execute(RecordSource::empty(), output, errors)
            .await
            .unwrap();
        collected.await.unwrap();
    });
}

fn chain(length: usize, unit: fn() -> Arc<dyn Unit>) -> Node {
    let root = Node::new(CounterUnit::new(RECORDS));
    let mut current = root.clone();
    for _ in 0..length {
        current = current.connect(&Node::from_unit(unit())).unwrap();
    }
    root
}

fn fan(width: usize, unit: fn() -> Arc<dyn Unit>) -> Node {
    let root = Node::new(CounterUnit::new(RECORDS));
    for _ in 0..width {
        root.connect(&Node::from_unit(unit())).unwrap();
    }
    root
}

fn units() -> Vec<(&'static str, fn() -> Arc<dyn Unit>)> {
    let mut units: Vec<(&'static str, fn() -> Arc<dyn Unit>)> = vec![("echo", echo)];
    #[cfg(unix)]
    units.push(("cat", cat));
    units
}

fn leaf_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaf");
    group.sample_size(10);
    group.throughput(Throughput::Elements(RECORDS));

    let counter = Node::new(CounterUnit::new(RECORDS));
    group.bench_function("counter", |b| b.iter(|| run_sync(&counter)));

    group.finish();
}

fn chain_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    group.sample_size(10);
    group.throughput(Throughput::Elements(RECORDS));

    for (name, unit) in units() {
        for length in [1, 2, 10] {
            let root = chain(length, unit);
            group.bench_with_input(BenchmarkId::new(name, length), &root, |b, root| {
                b.iter(|| run_sync(root))
            });
        }
    }

    group.finish();
}

fn fan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan");
    group.sample_size(10);
    group.throughput(Throughput::Elements(RECORDS));

    for (name, unit) in units() {
        for width in [2, 10] {
            let root = fan(width, unit);
            group.bench_with_input(BenchmarkId::new(name, width), &root, |b, root| {
                b.iter(|| run_sync(root))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, leaf_benchmark, chain_benchmark, fan_benchmark);
criterion_main!(benches);
