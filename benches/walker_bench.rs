//! Benchmarks for wordfreq-walker
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

const LINE: &str = "It was the best of times, it was the worst of times, it was the age of \
                    wisdom, it was the age of foolishness, it was the epoch of belief";

fn benchmark_tokenize(c: &mut Criterion) {
    use wordfreq_walker::tokenize::words;

    c.bench_function("tokenize_line", |b| {
        b.iter(|| {
            let count = words(black_box(LINE)).count();
            black_box(count);
        })
    });
}

fn benchmark_tracker(c: &mut Criterion) {
    use wordfreq_walker::tokenize::words;
    use wordfreq_walker::tracker::FrequencyTracker;

    c.bench_function("tracker_record_line", |b| {
        let tracker = FrequencyTracker::new(10);
        b.iter(|| {
            let recorded = tracker.record_all(words(black_box(LINE)));
            black_box(recorded);
        })
    });

    c.bench_function("tracker_snapshot", |b| {
        let tracker = FrequencyTracker::new(10);
        for i in 0..10_000 {
            tracker.record(&format!("word{}", i % 500));
        }
        b.iter(|| black_box(tracker.snapshot_top_k()))
    });
}

fn benchmark_queue(c: &mut Criterion) {
    use std::path::PathBuf;
    use wordfreq_walker::walker::queue::WorkQueue;

    c.bench_function("queue_push_claim", |b| {
        let queue = WorkQueue::new(1);
        b.iter(|| {
            queue.push(PathBuf::from("/test/path.txt"));
            let claim = queue.claim_or_retire();
            black_box(claim);
        })
    });
}

criterion_group!(benches, benchmark_tokenize, benchmark_tracker, benchmark_queue);
criterion_main!(benches);
