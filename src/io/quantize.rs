//! Float to 16-bit PCM conversion.

/*
Quantization Policy
===================

  scale     sample × 32767, so full scale ±1.0 maps to ±32767
  round     to nearest, halves away from zero (f32::round)
  clip      anything past the i16 range saturates to -32768 / 32767
  NaN       written as 0

-32768 is only reached by samples below -1.0. Saturated and NaN samples are
counted so callers can report them; an unstable IIR filter is the usual
source.
*/

use crate::buffer::SampleBuffer;

pub const I16_SCALE: f32 = 32767.0;

/// Interleaved 16-bit samples and how many of them had to be clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    pub samples: Vec<i16>,
    pub clipped: usize,
}

/// Converts one sample. The flag is set when the value did not fit.
#[inline]
pub fn quantize_sample(sample: f32) -> (i16, bool) {
    if sample.is_nan() {
        return (0, true);
    }

    let scaled = (sample * I16_SCALE).round();
    if scaled > i16::MAX as f32 {
        (i16::MAX, true)
    } else if scaled < i16::MIN as f32 {
        (i16::MIN, true)
    } else {
        (scaled as i16, false)
    }
}

/// Quantizes a whole buffer, interleaving channels frame by frame.
pub fn quantize_i16(buffer: &SampleBuffer) -> Quantized {
    let mut samples = Vec::with_capacity(buffer.len() * buffer.num_channels());
    let mut clipped = 0;

    for frame in 0..buffer.len() {
        for channel in buffer.channels() {
            let (value, did_clip) = quantize_sample(channel[frame]);
            clipped += did_clip as usize;
            samples.push(value);
        }
    }

    Quantized { samples, clipped }
}
