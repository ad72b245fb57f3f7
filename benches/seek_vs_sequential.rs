// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for frame access patterns.
//!
//! Measures the cost of:
//! - Sequential reads (the cheap default path)
//! - Arbitrary seeks (decode forward from the nearest preceding keyframe)
//!
//! Arbitrary seeks are expected to be markedly more expensive than
//! sequential reads; scrubbing-heavy callers should lean on the seek
//! cache or batch their work sequentially.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::path::PathBuf;
use vidlens::source::{CacheConfig, FrameSource};

/// Get the path to the sample video.
fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.mp4")
}

/// Benchmark sequential frame reads.
fn bench_sequential_read(c: &mut Criterion) {
    let path = sample_path();
    if !path.exists() {
        eprintln!("Sample video not found, skipping frame access benchmarks");
        return;
    }

    let mut group = c.benchmark_group("frame_access");

    let mut source = FrameSource::open_with_cache(&path, CacheConfig::disabled()).unwrap();
    group.bench_function("sequential_read", |b| {
        b.iter(|| {
            let frame = match source.read_sequential().unwrap() {
                Some(frame) => frame,
                None => {
                    // Wrap around at end of stream.
                    source.seek(0).unwrap()
                }
            };
            black_box(frame);
        });
    });

    group.finish();
}

/// Benchmark arbitrary seeks across the file.
///
/// The cache is disabled so every iteration pays the real demuxer seek
/// plus the decode forward from the preceding keyframe.
fn bench_arbitrary_seek(c: &mut Criterion) {
    let path = sample_path();
    if !path.exists() {
        return;
    }

    let mut group = c.benchmark_group("frame_access");
    // Seeks decode forward from a keyframe; give slow files room.
    group.sample_size(20);

    let mut source = FrameSource::open_with_cache(&path, CacheConfig::disabled()).unwrap();
    let total = source.info().total_frames;

    let mut step = 0u64;
    group.bench_function("arbitrary_seek", |b| {
        b.iter(|| {
            // Stride through the file so consecutive seeks never land on
            // adjacent frames.
            step = step.wrapping_add(37);
            let target = (step * 31) % total;
            black_box(source.seek(target as i64).unwrap());
        });
    });

    group.finish();
}

/// Benchmark cache-served repeated seeks for comparison.
fn bench_cached_seek(c: &mut Criterion) {
    let path = sample_path();
    if !path.exists() {
        return;
    }

    let mut group = c.benchmark_group("frame_access");

    let mut source = FrameSource::open(&path).unwrap();
    let target = (source.info().total_frames / 2) as i64;
    source.seek(target).unwrap();

    group.bench_function("cached_seek", |b| {
        b.iter(|| {
            black_box(source.seek(target).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_read,
    bench_arbitrary_seek,
    bench_cached_seek
);
criterion_main!(benches);
