//! Comb filters - a single delayed, scaled copy added back to the signal.

/*
Comb Filters
============

A comb filter adds one echo to a signal: the sample from `D` steps ago,
scaled by a gain `g`. Where that echo is taken from decides the filter.

  FIR (feedforward)   the echo is taken from the INPUT

      y[n] = x[n] + g * x[n - D]

      x ──┬──────────────────(+)──→ y
          │                   ↑
          └──→ [z^-D] ──→ (×g)┘

  IIR (feedback)      the echo is taken from the OUTPUT

      y[n] = x[n] + g * y[n - D]

      x ─────────────(+)──┬──→ y
                      ↑   │
               (×g) ←─[z^-D]┘


Impulse Responses
-----------------

Feed in [1, 0, 0, 0, ...] with D = 3, g = 0.5:

  FIR   1  0  0  0.5  0  0  0     0  0  0      one echo, then silence
  IIR   1  0  0  0.5  0  0  0.25  0  0  0.125  echoes of echoes, forever

The IIR echo is multiplied by g on every trip around the loop, so it only
dies away when |g| < 1. With |g| >= 1 the output grows without bound. That
is a legal (if loud) result, not an error.


Why "comb"
----------

The echo reinforces frequencies whose period divides D and cancels those
half a period out of step. Plotted against frequency the magnitude response
looks like the teeth of a comb, spaced fs / D apart (see `dsp::response`).


Ordering
--------

The FIR only reads the input, so any sample could be computed at any time.
The IIR reads its own earlier output: y[n] needs y[n - D], which must already
be final. Within a channel the loop runs strictly forward. Channels never
read each other and are processed in parallel with the `parallel` feature.
*/

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::error::{CombError, CombResult};

/// Which history the delayed tap reads from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombKind {
    /// Feedforward: tap reads past input samples.
    #[default]
    Fir,
    /// Feedback: tap reads past output samples.
    Iir,
}

impl FromStr for CombKind {
    type Err = Infallible;

    /// Exactly `"fir"` selects the feedforward filter, anything else the
    /// feedback one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "fir" {
            Ok(CombKind::Fir)
        } else {
            Ok(CombKind::Iir)
        }
    }
}

impl fmt::Display for CombKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombKind::Fir => write!(f, "fir"),
            CombKind::Iir => write!(f, "iir"),
        }
    }
}

/// Operating point of a comb filter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombParams {
    /// Sample rate in Hz, must be non-zero
    pub sample_rate: u32,
    /// Tap coefficient. Must be finite, otherwise not range-checked.
    pub gain: f32,
    /// Delay in seconds, must be finite and >= 0
    pub delay_sec: f64,
}

impl CombParams {
    pub fn new(sample_rate: u32, gain: f32, delay_sec: f64) -> Self {
        Self {
            sample_rate,
            gain,
            delay_sec,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_delay(mut self, delay_sec: f64) -> Self {
        self.delay_sec = delay_sec;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Validated delay in whole samples.
    pub fn delay_samples(&self) -> CombResult<usize> {
        delay_samples(self.sample_rate, self.delay_sec)
    }

    /// Checks every field and returns the delay in whole samples.
    pub fn validate(&self) -> CombResult<usize> {
        if !self.gain.is_finite() {
            return Err(CombError::InvalidParameter(format!(
                "gain must be finite, got {}",
                self.gain
            )));
        }
        self.delay_samples()
    }
}

impl Default for CombParams {
    fn default() -> Self {
        Self::new(48_000, 0.5, 0.25)
    }
}

/// Converts a delay in seconds to whole samples, truncating toward zero.
///
/// The product is taken in `f64` so that e.g. `10 Hz * 0.3 s` is 3 samples.
pub fn delay_samples(sample_rate: u32, delay_sec: f64) -> CombResult<usize> {
    if sample_rate == 0 {
        return Err(CombError::InvalidParameter(
            "sample rate must be positive".to_string(),
        ));
    }
    if !delay_sec.is_finite() || delay_sec < 0.0 {
        return Err(CombError::InvalidParameter(format!(
            "delay must be a non-negative number of seconds, got {}",
            delay_sec
        )));
    }

    Ok((sample_rate as f64 * delay_sec).floor() as usize)
}

/// Feedforward comb filter: `y[n] = x[n] + gain * x[n - D]`.
pub fn apply_fir(
    input: &SampleBuffer,
    sample_rate: u32,
    gain: f32,
    delay_sec: f64,
) -> CombResult<SampleBuffer> {
    apply(
        CombKind::Fir,
        input,
        CombParams::new(sample_rate, gain, delay_sec),
    )
}

/// Feedback comb filter: `y[n] = x[n] + gain * y[n - D]`.
pub fn apply_iir(
    input: &SampleBuffer,
    sample_rate: u32,
    gain: f32,
    delay_sec: f64,
) -> CombResult<SampleBuffer> {
    apply(
        CombKind::Iir,
        input,
        CombParams::new(sample_rate, gain, delay_sec),
    )
}

/// Runs the comb filter selected by `kind` and returns a new buffer of the
/// same shape as `input`.
pub fn apply(kind: CombKind, input: &SampleBuffer, params: CombParams) -> CombResult<SampleBuffer> {
    let mut output = SampleBuffer::silence(input.num_channels(), input.len());
    process_into(kind, input, params, &mut output)?;
    Ok(output)
}

/// Like [`apply`], writing into a preallocated `output`.
///
/// `output` must have the same channel count and length as `input`.
pub fn process_into(
    kind: CombKind,
    input: &SampleBuffer,
    params: CombParams,
    output: &mut SampleBuffer,
) -> CombResult<()> {
    let delay = params.validate()?;

    if input.num_channels() == 0 {
        return Err(CombError::InvalidParameter(
            "input buffer has no channels".to_string(),
        ));
    }
    if !input.same_shape(output) {
        return Err(CombError::shape(input.shape(), output.shape()));
    }

    if kind == CombKind::Iir && params.gain.abs() >= 1.0 && delay < input.len() {
        log::warn!(
            "IIR comb gain {} is not below 1.0, output will not decay",
            params.gain
        );
    }
    log::debug!(
        "{} comb: {} channel(s) x {} frames, delay {} samples, gain {}",
        kind,
        input.num_channels(),
        input.len(),
        delay,
        params.gain
    );

    let gain = params.gain;

    #[cfg(feature = "parallel")]
    output
        .channels_mut()
        .par_iter_mut()
        .zip(input.channels().par_iter())
        .for_each(|(out, inp)| render_channel(kind, inp, out, gain, delay));

    #[cfg(not(feature = "parallel"))]
    output
        .channels_mut()
        .iter_mut()
        .zip(input.channels().iter())
        .for_each(|(out, inp)| render_channel(kind, inp, out, gain, delay));

    Ok(())
}

/// The recurrence for one channel. `output` is seeded with the input sample
/// before the tap is added, so a zero-length IIR delay reads `x[n]`.
#[inline]
fn render_channel(kind: CombKind, input: &[f32], output: &mut [f32], gain: f32, delay: usize) {
    for n in 0..input.len() {
        output[n] = input[n];
        if n >= delay {
            let tap = match kind {
                CombKind::Fir => input[n - delay],
                CombKind::Iir => output[n - delay],
            };
            output[n] += gain * tap;
        }
    }
}
