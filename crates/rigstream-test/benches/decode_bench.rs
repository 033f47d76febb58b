//! Benchmarks for the rigstream wire format

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rigstream_test::{malformed_corpus, ProducerConfig, SyntheticProducer};
use rigstream_wire::{decode_frame, encode_frame};

fn bench_decode_full_frame(c: &mut Criterion) {
    let mut producer = SyntheticProducer::new(ProducerConfig::still(), 1);
    let bytes = encode_frame(&producer.next_frame()).unwrap();

    c.bench_function("decode_full_frame", |b| {
        b.iter(|| decode_frame(black_box(&bytes)))
    });
}

fn bench_decode_pose_only(c: &mut Criterion) {
    let config = ProducerConfig {
        hand_dropout: 1.0,
        metrics: false,
        ..ProducerConfig::still()
    };
    let mut producer = SyntheticProducer::new(config, 1);
    let bytes = encode_frame(&producer.next_frame()).unwrap();

    c.bench_function("decode_pose_only", |b| {
        b.iter(|| decode_frame(black_box(&bytes)))
    });
}

fn bench_reject_malformed(c: &mut Criterion) {
    let corpus = malformed_corpus();

    c.bench_function("reject_malformed_corpus", |b| {
        b.iter(|| {
            for case in &corpus {
                let _ = black_box(decode_frame(black_box(&case.bytes)));
            }
        })
    });
}

fn bench_encode_full_frame(c: &mut Criterion) {
    let mut producer = SyntheticProducer::new(ProducerConfig::still(), 1);
    let frame = producer.next_frame();

    c.bench_function("encode_full_frame", |b| {
        b.iter(|| encode_frame(black_box(&frame)))
    });
}

criterion_group!(
    benches,
    bench_decode_full_frame,
    bench_decode_pose_only,
    bench_reject_malformed,
    bench_encode_full_frame
);
criterion_main!(benches);
