//! Magnitude response of a comb filter.
//!
//! The response is measured rather than derived: an impulse is pushed through
//! the engine and the result is transformed with an FFT. For the IIR filter the
//! impulse response never ends, so `fft_len` should be several delays long for
//! the tail to have decayed.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::buffer::SampleBuffer;
use crate::dsp::comb::{process_into, CombKind, CombParams};
use crate::error::{CombError, CombResult};

/// Linear magnitudes for bins `0..=fft_len / 2`.
pub fn magnitude_response(
    kind: CombKind,
    gain: f32,
    delay_samples: usize,
    fft_len: usize,
) -> CombResult<Vec<f32>> {
    if fft_len == 0 {
        return Err(CombError::InvalidParameter(
            "FFT length must be at least 1".to_string(),
        ));
    }

    let mut impulse = vec![0.0f32; fft_len];
    impulse[0] = 1.0;
    let input = SampleBuffer::mono(impulse);
    let mut output = SampleBuffer::silence(1, fft_len);

    // One sample per second makes the delay in seconds equal the delay in samples
    let params = CombParams::new(1, gain, delay_samples as f64);
    process_into(kind, &input, params, &mut output)?;

    let mut spectrum: Vec<Complex<f32>> = output
        .channel(0)
        .unwrap_or_default()
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_len);
    fft.process(&mut spectrum);

    Ok(spectrum[..=fft_len / 2].iter().map(|c| c.norm()).collect())
}

/// Centre frequency of `bin` in Hz.
pub fn bin_frequency(bin: usize, fft_len: usize, sample_rate: u32) -> f64 {
    bin as f64 * sample_rate as f64 / fft_len as f64
}

/// Indices of local maxima (`peaks = true`) or minima of `magnitudes`,
/// strongest first, at most `count` of them.
pub fn extrema(magnitudes: &[f32], peaks: bool, count: usize) -> Vec<usize> {
    let mut found: Vec<usize> = (1..magnitudes.len().saturating_sub(1))
        .filter(|&i| {
            let (prev, cur, next) = (magnitudes[i - 1], magnitudes[i], magnitudes[i + 1]);
            if peaks {
                cur > prev && cur >= next
            } else {
                cur < prev && cur <= next
            }
        })
        .collect();

    found.sort_by(|&a, &b| {
        let ord = magnitudes[a].total_cmp(&magnitudes[b]);
        if peaks {
            ord.reverse()
        } else {
            ord
        }
    });
    found.truncate(count);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fir_nulls_at_half_delay_frequency() {
        // d = 8, fft_len = 64: nulls at bins 4, 12, 20, 28
        let mags = magnitude_response(CombKind::Fir, 1.0, 8, 64).unwrap();
        assert_eq!(mags.len(), 33);
        assert!((mags[0] - 2.0).abs() < 1e-5);
        for bin in [4, 12, 20, 28] {
            assert!(mags[bin] < 1e-5, "bin {} = {}", bin, mags[bin]);
        }
        assert!((mags[8] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_iir_peaks_at_delay_harmonics() {
        let mags = magnitude_response(CombKind::Iir, 0.5, 4, 256).unwrap();
        // Peaks of 1 / (1 - g) at multiples of fs / d, valleys of 1 / (1 + g) between
        assert!((mags[0] - 2.0).abs() < 1e-3);
        assert!((mags[64] - 2.0).abs() < 1e-3);
        assert!((mags[32] - 1.0 / 1.5).abs() < 1e-3);

        // DC and Nyquist sit on the edges, so only the middle peak is interior
        assert_eq!(extrema(&mags, true, 4), vec![64]);
        assert_eq!(extrema(&mags, false, 4).len(), 2);
    }

    #[test]
    fn test_bin_frequency() {
        assert_eq!(bin_frequency(0, 1024, 48_000), 0.0);
        assert_eq!(bin_frequency(512, 1024, 48_000), 24_000.0);
    }

    #[test]
    fn test_rejects_empty_fft() {
        assert!(magnitude_response(CombKind::Fir, 0.5, 1, 0).is_err());
    }
}
