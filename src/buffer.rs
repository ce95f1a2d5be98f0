//! Channel-major sample storage shared by the engine, the file I/O and the
//! comparator.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CombError, CombResult};

/// One or more channels of `f32` samples, all of the same length.
///
/// Samples are nominally in `[-1.0, 1.0]`, but nothing here clamps them: an
/// unstable IIR filter is allowed to produce larger values and quantization
/// decides what to do with them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Single-channel buffer.
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            channels: vec![samples],
        }
    }

    /// Builds a buffer from per-channel vectors.
    ///
    /// Fails with `ShapeMismatch` if the channels differ in length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> CombResult<Self> {
        if let Some(first) = channels.first() {
            let len = first.len();
            if let Some(bad) = channels.iter().find(|c| c.len() != len) {
                return Err(CombError::shape(
                    (channels.len(), len),
                    (channels.len(), bad.len()),
                ));
            }
        }
        Ok(Self { channels })
    }

    /// Deinterleaves `frame0ch0, frame0ch1, frame1ch0, ...`.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], num_channels: usize) -> CombResult<Self> {
        if num_channels == 0 {
            return Err(CombError::InvalidParameter(
                "channel count must be at least 1".to_string(),
            ));
        }

        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Ok(Self { channels })
    }

    /// `num_channels` channels of `len` zeros.
    pub fn silence(num_channels: usize, len: usize) -> Self {
        Self {
            channels: vec![vec![0.0; len]; num_channels],
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(channels, frames)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_channels(), self.len())
    }

    pub fn same_shape(&self, other: &SampleBuffer) -> bool {
        self.shape() == other.shape()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Mutable access to the channels. Lengths cannot change through a slice,
    /// so the shape invariant holds.
    pub fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Frame-major copy of the samples.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * self.num_channels());
        for i in 0..self.len() {
            for channel in &self.channels {
                out.push(channel[i]);
            }
        }
        out
    }

    /// Largest absolute sample across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}
