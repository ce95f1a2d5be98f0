//! Block-at-a-time comb filter.
//!
//! [`CombFilter`] runs the same recurrence as [`crate::dsp::comb::apply`], but
//! keeps its history in per-channel [`DelayLine`]s so a long signal can be fed
//! through in blocks. Feeding a signal in blocks of any size produces the same
//! samples as filtering it in one go.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::comb::{delay_samples, CombKind};
use crate::dsp::delay::DelayLine;
use crate::error::{CombError, CombResult};
use crate::MAX_DELAY_SAMPLES;

/// Parameters adjustable after construction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterParam {
    Gain,
    /// Delay in seconds
    Delay,
}

pub struct CombFilter {
    kind: CombKind,
    sample_rate: u32,
    gain: f32,
    delay_samples: usize,
    max_delay_samples: usize,
    lines: Vec<DelayLine>,
}

impl CombFilter {
    /// Creates a filter whose delay may later be raised up to `max_delay_sec`.
    pub fn new(
        kind: CombKind,
        max_delay_sec: f64,
        sample_rate: u32,
        num_channels: usize,
        gain: f32,
        delay_sec: f64,
    ) -> CombResult<Self> {
        if num_channels == 0 {
            return Err(CombError::InvalidParameter(
                "channel count must be at least 1".to_string(),
            ));
        }
        check_gain(gain)?;

        let max_delay_samples = delay_samples(sample_rate, max_delay_sec)?;
        if max_delay_samples > MAX_DELAY_SAMPLES {
            return Err(CombError::InvalidParameter(format!(
                "maximum delay {}s is {} samples, the limit is {}",
                max_delay_sec, max_delay_samples, MAX_DELAY_SAMPLES
            )));
        }
        let delay = delay_samples(sample_rate, delay_sec)?;
        if delay > max_delay_samples {
            return Err(CombError::InvalidParameter(format!(
                "delay {}s exceeds the maximum of {}s",
                delay_sec, max_delay_sec
            )));
        }

        Ok(Self {
            kind,
            sample_rate,
            gain,
            delay_samples: delay,
            max_delay_samples,
            lines: vec![DelayLine::new(max_delay_samples); num_channels],
        })
    }

    pub fn kind(&self) -> CombKind {
        self.kind
    }

    pub fn num_channels(&self) -> usize {
        self.lines.len()
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Clears the history of every channel.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
    }

    pub fn set_param(&mut self, param: FilterParam, value: f64) -> CombResult<()> {
        match param {
            FilterParam::Gain => {
                let gain = value as f32;
                check_gain(gain)?;
                self.gain = gain;
            }
            FilterParam::Delay => {
                let delay = delay_samples(self.sample_rate, value)?;
                if delay > self.max_delay_samples {
                    return Err(CombError::InvalidParameter(format!(
                        "delay {}s exceeds the maximum of {} samples",
                        value, self.max_delay_samples
                    )));
                }
                self.delay_samples = delay;
            }
        }
        Ok(())
    }

    /// Current value of `param`. The delay is reported after truncation to
    /// whole samples.
    pub fn get_param(&self, param: FilterParam) -> f64 {
        match param {
            FilterParam::Gain => self.gain as f64,
            FilterParam::Delay => self.delay_samples as f64 / self.sample_rate as f64,
        }
    }

    /// Filters one block per channel. Every input and output slice must be the
    /// same length, and there must be one of each per channel.
    pub fn process(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]) -> CombResult<()> {
        let channels = self.lines.len();
        let frames = input.first().map_or(0, |c| c.len());

        check_block_shape((channels, frames), input.iter().map(|c| c.len()))?;
        check_block_shape((channels, frames), output.iter().map(|c| c.len()))?;

        let (kind, gain, delay) = (self.kind, self.gain, self.delay_samples);
        for ((line, inp), out) in self.lines.iter_mut().zip(input).zip(output.iter_mut()) {
            for (&x, y) in inp.iter().zip(out.iter_mut()) {
                let tap = if delay == 0 { x } else { line.read(delay) };
                *y = x + gain * tap;
                line.write(match kind {
                    CombKind::Fir => x,
                    CombKind::Iir => *y,
                });
            }
        }

        Ok(())
    }
}

/// Fails unless there are `channels` slices of `frames` samples each. The
/// error reports the slice count and the first offending length.
fn check_block_shape(
    (channels, frames): (usize, usize),
    mut lens: impl ExactSizeIterator<Item = usize>,
) -> CombResult<()> {
    let count = lens.len();
    let bad_len = lens.find(|&l| l != frames);
    if count != channels || bad_len.is_some() {
        return Err(CombError::shape(
            (channels, frames),
            (count, bad_len.unwrap_or(frames)),
        ));
    }
    Ok(())
}

fn check_gain(gain: f32) -> CombResult<()> {
    if gain.is_finite() {
        Ok(())
    } else {
        Err(CombError::InvalidParameter(format!(
            "gain must be finite, got {}",
            gain
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleBuffer;
    use crate::dsp::comb::{apply, CombParams};

    fn run_in_blocks(filter: &mut CombFilter, signal: &[Vec<f32>], block: usize) -> Vec<Vec<f32>> {
        let len = signal[0].len();
        let mut out = vec![vec![0.0; len]; signal.len()];
        let mut start = 0;
        while start < len {
            let end = (start + block).min(len);
            let ins: Vec<&[f32]> = signal.iter().map(|c| &c[start..end]).collect();
            let mut outs: Vec<&mut [f32]> = out.iter_mut().map(|c| &mut c[start..end]).collect();
            filter.process(&ins, &mut outs).unwrap();
            start = end;
        }
        out
    }

    fn test_signal() -> Vec<Vec<f32>> {
        vec![
            (0..257).map(|i| (i as f32 * 0.13).sin()).collect(),
            (0..257).map(|i| if i % 17 == 0 { 1.0 } else { -0.1 }).collect(),
        ]
    }

    #[test]
    fn test_blocks_match_offline_engine() {
        let signal = test_signal();
        let buffer = SampleBuffer::from_channels(signal.clone()).unwrap();

        for kind in [CombKind::Fir, CombKind::Iir] {
            let expected = apply(kind, &buffer, CombParams::new(1_000, 0.7, 0.011)).unwrap();
            for block in [1, 3, 7, 64, 300] {
                let mut filter = CombFilter::new(kind, 0.05, 1_000, 2, 0.7, 0.011).unwrap();
                let out = run_in_blocks(&mut filter, &signal, block);
                assert_eq!(out, expected.channels(), "{} block size {}", kind, block);
            }
        }
    }

    #[test]
    fn test_zero_delay_matches_offline_engine() {
        let signal = test_signal();
        let buffer = SampleBuffer::from_channels(signal.clone()).unwrap();
        let expected = apply(CombKind::Iir, &buffer, CombParams::new(100, 0.5, 0.0)).unwrap();

        let mut filter = CombFilter::new(CombKind::Iir, 1.0, 100, 2, 0.5, 0.0).unwrap();
        assert_eq!(run_in_blocks(&mut filter, &signal, 32), expected.channels());
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut filter = CombFilter::new(CombKind::Iir, 1.0, 4, 1, 0.5, 0.5).unwrap();
        let mut out = vec![0.0; 2];

        filter.process(&[&[1.0, 0.0][..]], &mut [&mut out[..]]).unwrap();
        filter.reset();
        filter.process(&[&[0.0, 0.0][..]], &mut [&mut out[..]]).unwrap();
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn test_params_round_trip() {
        let mut filter = CombFilter::new(CombKind::Fir, 1.0, 44_100, 1, 0.5, 0.25).unwrap();
        assert_eq!(filter.get_param(FilterParam::Gain), 0.5);
        assert_eq!(filter.get_param(FilterParam::Delay), 0.25);

        filter.set_param(FilterParam::Gain, 0.25).unwrap();
        filter.set_param(FilterParam::Delay, 0.5).unwrap();
        assert_eq!(filter.get_param(FilterParam::Gain), 0.25);
        assert_eq!(filter.get_param(FilterParam::Delay), 0.5);
        assert_eq!(filter.delay_samples(), 22_050);
    }

    #[test]
    fn test_rejects_out_of_range_params() {
        let mut filter = CombFilter::new(CombKind::Iir, 0.1, 1_000, 1, 0.5, 0.05).unwrap();
        assert!(filter.set_param(FilterParam::Delay, 0.2).is_err());
        assert!(filter.set_param(FilterParam::Delay, -0.01).is_err());
        assert!(filter.set_param(FilterParam::Gain, f64::INFINITY).is_err());
        assert_eq!(filter.delay_samples(), 50);

        assert!(CombFilter::new(CombKind::Fir, 0.1, 1_000, 1, 0.5, 0.2).is_err());
        assert!(CombFilter::new(CombKind::Fir, 0.1, 0, 1, 0.5, 0.0).is_err());
        assert!(CombFilter::new(CombKind::Fir, 0.1, 1_000, 0, 0.5, 0.0).is_err());
    }

    #[test]
    fn test_rejects_huge_max_delay() {
        // Saturates to usize::MAX samples
        let result = CombFilter::new(CombKind::Fir, 1e300, 48_000, 1, 0.5, 0.0);
        assert!(matches!(result, Err(CombError::InvalidParameter(_))));

        // At 1 Hz seconds and samples coincide
        let just_over = (MAX_DELAY_SAMPLES + 1) as f64;
        let result = CombFilter::new(CombKind::Iir, just_over, 1, 2, 0.5, 0.0);
        assert!(matches!(result, Err(CombError::InvalidParameter(_))));
        assert!(CombFilter::new(CombKind::Iir, 4.0, 1, 1, 0.5, 0.0).is_ok());
    }

    #[test]
    fn test_shape_error_reports_first_bad_length() {
        let mut filter = CombFilter::new(CombKind::Fir, 0.1, 1_000, 2, 0.5, 0.01).unwrap();
        let a = [0.0f32; 8];
        let b = [0.0f32; 7];
        let mut out_a = [0.0f32; 8];
        let mut out_b = [0.0f32; 5];

        let err = filter.process(&[&a[..], &b[..]], &mut [&mut out_a[..], &mut out_b[..]]);
        assert_eq!(err, Err(CombError::shape((2, 8), (2, 7))));

        let err = filter.process(&[&a[..], &a[..]], &mut [&mut out_a[..], &mut out_b[..]]);
        assert_eq!(err, Err(CombError::shape((2, 8), (2, 5))));

        let err = filter.process(&[&a[..]], &mut [&mut out_a[..]]);
        assert_eq!(err, Err(CombError::shape((2, 8), (1, 8))));
    }

    #[test]
    fn test_rejects_mismatched_blocks() {
        let mut filter = CombFilter::new(CombKind::Fir, 0.1, 1_000, 2, 0.5, 0.01).unwrap();
        let a = [0.0f32; 8];
        let b = [0.0f32; 7];
        let mut out_a = [0.0f32; 8];
        let mut out_b = [0.0f32; 8];

        let result = filter.process(&[&a[..]], &mut [&mut out_a[..]]);
        assert!(matches!(result, Err(CombError::ShapeMismatch { .. })));

        let result = filter.process(&[&a[..], &b[..]], &mut [&mut out_a[..], &mut out_b[..]]);
        assert!(matches!(result, Err(CombError::ShapeMismatch { .. })));
    }
}
