//! Sample-level comparison of two renders of the same material.
//!
//! Both sides must agree on sample rate and shape; anything else is reported
//! as an error instead of a difference.

pub mod plot;

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buffer::SampleBuffer;
use crate::error::CombError;
use crate::io::wav::read_wav;
use crate::io::AudioIoError;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Sample rate mismatch: {0} Hz vs {1} Hz")]
    SampleRateMismatch(u32, u32),

    #[error("Shape mismatch: {left_channels}x{left_frames} vs {right_channels}x{right_frames}")]
    ShapeMismatch {
        left_channels: usize,
        left_frames: usize,
        right_channels: usize,
        right_frames: usize,
    },

    #[error(transparent)]
    Io(#[from] AudioIoError),

    #[error(transparent)]
    Dsp(#[from] CombError),

    #[error("Failed to write plot: {0}")]
    Plot(#[from] std::io::Error),
}

pub type CompareResult<T> = Result<T, CompareError>;

/// Summary of one channel of a difference signal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelStats {
    /// Largest absolute difference
    pub peak: f32,
    /// Frame where `peak` occurs (first one on ties)
    pub peak_index: usize,
    pub rms: f32,
}

impl ChannelStats {
    fn measure(samples: &[f32]) -> Self {
        let mut stats = ChannelStats::default();
        let mut sum_sq = 0.0f64;
        for (i, &s) in samples.iter().enumerate() {
            if s.abs() > stats.peak {
                stats.peak = s.abs();
                stats.peak_index = i;
            }
            sum_sq += (s as f64) * (s as f64);
        }
        if !samples.is_empty() {
            stats.rms = (sum_sq / samples.len() as f64).sqrt() as f32;
        }
        stats
    }
}

/// `left - right`, sample by sample.
#[derive(Debug, Clone)]
pub struct Difference {
    pub sample_rate: u32,
    pub signal: SampleBuffer,
    pub stats: Vec<ChannelStats>,
}

impl Difference {
    /// Largest absolute difference over all channels.
    pub fn peak(&self) -> f32 {
        self.stats.iter().fold(0.0f32, |acc, s| acc.max(s.peak))
    }

    /// True when no sample differs by more than `tolerance`.
    pub fn within(&self, tolerance: f32) -> bool {
        self.peak() <= tolerance
    }

    pub fn duration_sec(&self) -> f64 {
        self.signal.len() as f64 / self.sample_rate as f64
    }
}

/// Differences two in-memory buffers.
pub fn compare_buffers(
    left: &SampleBuffer,
    left_rate: u32,
    right: &SampleBuffer,
    right_rate: u32,
) -> CompareResult<Difference> {
    if left_rate != right_rate {
        return Err(CompareError::SampleRateMismatch(left_rate, right_rate));
    }
    if !left.same_shape(right) {
        return Err(CompareError::ShapeMismatch {
            left_channels: left.num_channels(),
            left_frames: left.len(),
            right_channels: right.num_channels(),
            right_frames: right.len(),
        });
    }

    let channels: Vec<Vec<f32>> = left
        .channels()
        .iter()
        .zip(right.channels())
        .map(|(l, r)| l.iter().zip(r).map(|(a, b)| a - b).collect())
        .collect();
    let stats = channels.iter().map(|c| ChannelStats::measure(c)).collect();

    Ok(Difference {
        sample_rate: left_rate,
        signal: SampleBuffer::from_channels(channels)?,
        stats,
    })
}

/// Loads two WAV files and differences them.
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(left: P, right: Q) -> CompareResult<Difference> {
    let l = read_wav(left.as_ref())?;
    let r = read_wav(right.as_ref())?;
    log::debug!(
        "comparing {} against {}",
        left.as_ref().display(),
        right.as_ref().display()
    );

    let diff = compare_buffers(&l.samples, l.sample_rate, &r.samples, r.sample_rate)?;
    for (i, stats) in diff.stats.iter().enumerate() {
        log::info!(
            "channel {}: peak {:.6} at frame {}, rms {:.6}",
            i + 1,
            stats.peak,
            stats.peak_index,
            stats.rms
        );
    }
    Ok(diff)
}
