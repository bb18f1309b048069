//! Criterion micro-benchmarks for the replay codec and ward hashing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simicu_bench::{populated_world, stress_config};
use simicu_core::{Action, Decision, PatientId};
use simicu_replay::codec::{decode_frame, encode_frame};
use simicu_replay::hash::ward_hash;
use simicu_replay::Frame;

fn frames(n: u64) -> Vec<Frame> {
    (1..=n)
        .map(|tick| Frame {
            tick_id: tick,
            decision: Decision::new(PatientId(tick / 3), Action::AdmitBed),
            ward_hash: tick.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        })
        .collect()
}

/// Benchmark: encode 1000 frames.
fn bench_encode_1000_frames(c: &mut Criterion) {
    let frames = frames(1000);

    c.bench_function("codec_encode_1000_frames", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(26 * 1000);
            for f in &frames {
                encode_frame(&mut buf, f).unwrap();
            }
            black_box(&buf);
        });
    });
}

/// Benchmark: decode the same 1000 frames.
fn bench_decode_1000_frames(c: &mut Criterion) {
    let mut encoded = Vec::new();
    for f in &frames(1000) {
        encode_frame(&mut encoded, f).unwrap();
    }

    c.bench_function("codec_decode_1000_frames", |b| {
        b.iter(|| {
            let mut cursor = encoded.as_slice();
            while let Some(frame) = decode_frame(&mut cursor).unwrap() {
                black_box(&frame);
            }
        });
    });
}

/// Benchmark: hash a stress-profile ward after 500 ticks.
fn bench_ward_hash_stress(c: &mut Criterion) {
    let world = populated_world(stress_config(42), 500).unwrap();

    c.bench_function("ward_hash_stress_500_ticks", |b| {
        b.iter(|| black_box(ward_hash(&world)));
    });
}

criterion_group!(
    benches,
    bench_encode_1000_frames,
    bench_decode_1000_frames,
    bench_ward_hash_stress
);
criterion_main!(benches);
