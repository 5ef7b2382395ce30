//! Benchmarks for directory and snapshot rebuilds
//!
//! Covers the consumer side of one polling cycle:
//! - Directory rebuild from a description list
//! - Snapshot rebuild from a drained batch
//! - Wire encoding of a frame's tracked bodies
//!
//! Platform: Cross-platform (synthetic frames, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use posecast::bridge::WireRecord;
use posecast::test_utils::crowded_frame;
use posecast::types::AssetDescription;
use posecast::{AssetDirectory, PoseSnapshot, UnresolvedPolicy};
use std::hint::black_box;

fn descriptions(bodies: i32) -> Vec<AssetDescription> {
    (0..bodies)
        .flat_map(|id| {
            let name = format!("body-{id}");
            [AssetDescription::marker_set(&name), AssetDescription::rigid_body(id, &name)]
        })
        .collect()
}

fn bench_directory_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("directory_rebuild");

    for bodies in [4, 32] {
        let list = descriptions(bodies);
        group.throughput(Throughput::Elements(list.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(bodies), &list, |b, list| {
            let mut directory = AssetDirectory::new();
            b.iter(|| directory.rebuild(black_box(list)))
        });
    }

    group.finish();
}

fn bench_snapshot_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_rebuild");

    for bodies in [4, 32] {
        let directory = AssetDirectory::from_descriptions(&descriptions(bodies));
        let batch = vec![crowded_frame(1, bodies)];
        group.throughput(Throughput::Elements(bodies as u64));

        group.bench_with_input(BenchmarkId::from_parameter(bodies), &batch, |b, batch| {
            let mut snapshot = PoseSnapshot::new();
            b.iter(|| black_box(snapshot.rebuild(black_box(batch), &directory, UnresolvedPolicy::Placeholder)))
        });
    }

    group.finish();
}

fn bench_wire_encoding(c: &mut Criterion) {
    let frame = crowded_frame(1, 32);

    c.bench_function("wire_encode_tracked_bodies", |b| {
        b.iter(|| {
            frame
                .tracked_bodies()
                .map(|body| WireRecord::from(body).to_bytes())
                .fold(0u8, |acc, bytes| acc ^ black_box(bytes)[0])
        })
    });
}

criterion_group!(benches, bench_directory_rebuild, bench_snapshot_rebuild, bench_wire_encoding);
criterion_main!(benches);
