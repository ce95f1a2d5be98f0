//! Benchmarks for the comb filters.
//!
//! Run with: cargo bench
//!
//! Benchmark groups:
//!   - comb/offline  Whole-buffer FIR and IIR over one second of stereo
//!   - comb/block    The stateful filter at common callback sizes
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::hint::black_box;

use combfx::dsp::{process_into, CombFilter};
use combfx::{CombKind, CombParams, SampleBuffer};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

const SAMPLE_RATE: u32 = 48_000;

fn test_signal(len: usize) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * 0.1).sin()).collect()
}

fn bench_offline(c: &mut Criterion) {
    let mut group = c.benchmark_group("comb/offline");

    let input = SampleBuffer::from_channels(vec![
        test_signal(SAMPLE_RATE as usize),
        test_signal(SAMPLE_RATE as usize),
    ])
    .unwrap();
    let mut output = SampleBuffer::silence(2, SAMPLE_RATE as usize);

    // 10ms, 100ms, 250ms
    for &delay_sec in &[0.01, 0.1, 0.25] {
        let params = CombParams::new(SAMPLE_RATE, 0.5, delay_sec);
        for kind in [CombKind::Fir, CombKind::Iir] {
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), format!("{}ms", (delay_sec * 1000.0) as u32)),
                &params,
                |b, &params| {
                    b.iter(|| {
                        process_into(kind, black_box(&input), params, &mut output).unwrap();
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("comb/block");

    for &size in BLOCK_SIZES {
        let left = test_signal(size);
        let right = test_signal(size);
        let mut out_l = vec![0.0f32; size];
        let mut out_r = vec![0.0f32; size];

        for kind in [CombKind::Fir, CombKind::Iir] {
            let mut filter = CombFilter::new(kind, 1.0, SAMPLE_RATE, 2, 0.5, 0.25).unwrap();
            group.bench_with_input(BenchmarkId::new(kind.to_string(), size), &size, |b, _| {
                b.iter(|| {
                    let input = [&left[..], &right[..]];
                    let mut output = [&mut out_l[..], &mut out_r[..]];
                    filter.process(black_box(&input), &mut output).unwrap();
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_offline, bench_block);
criterion_main!(benches);
