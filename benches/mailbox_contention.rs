//! Benchmarks for the frame mailbox hand-off
//!
//! Measures the cost the capture thread pays per frame:
//! - Uncontended enqueue with eviction (capacity 1 and a deeper queue)
//! - Enqueue while a consumer drains from another thread
//! - Drain of a full queue
//!
//! Platform: Cross-platform (synthetic frames, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use posecast::FrameMailbox;
use posecast::test_utils::crowded_frame;
use std::hint::black_box;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn mailbox(capacity: usize) -> FrameMailbox {
    FrameMailbox::new(NonZeroUsize::new(capacity).expect("capacity"), Duration::from_millis(5))
}

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("mailbox_enqueue");
    group.throughput(Throughput::Elements(1));

    for capacity in [1usize, 8] {
        let mailbox = mailbox(capacity);
        let frame = crowded_frame(0, 16);

        group.bench_with_input(BenchmarkId::new("uncontended", capacity), &capacity, |b, _| {
            b.iter(|| black_box(mailbox.enqueue(black_box(frame.clone()))))
        });
    }

    group.finish();
}

fn bench_enqueue_with_consumer(c: &mut Criterion) {
    let mailbox = Arc::new(mailbox(1));
    let running = Arc::new(AtomicBool::new(true));

    let consumer = {
        let mailbox = Arc::clone(&mailbox);
        let running = Arc::clone(&running);
        std::thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                black_box(mailbox.drain());
            }
        })
    };

    let frame = crowded_frame(0, 16);
    c.bench_function("mailbox_enqueue_with_consumer", |b| {
        b.iter(|| black_box(mailbox.enqueue(black_box(frame.clone()))))
    });

    running.store(false, Ordering::Relaxed);
    consumer.join().expect("consumer thread");
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("mailbox_drain");

    for capacity in [1usize, 8] {
        let mailbox = mailbox(capacity);
        group.throughput(Throughput::Elements(capacity as u64));

        group.bench_with_input(BenchmarkId::new("full_queue", capacity), &capacity, |b, &capacity| {
            b.iter_batched(
                || {
                    for n in 0..capacity as u32 {
                        mailbox.enqueue(crowded_frame(n, 16));
                    }
                },
                |()| black_box(mailbox.drain()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enqueue, bench_enqueue_with_consumer, bench_drain);
criterion_main!(benches);
