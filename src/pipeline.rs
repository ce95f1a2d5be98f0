//! File-to-file processing: decode, resample, filter, quantize, encode.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::comb::{apply, CombKind, CombParams};
use crate::error::CombError;
use crate::io::resample::resample;
use crate::io::wav::{read_wav, write_wav_i16};
use crate::io::AudioIoError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] AudioIoError),

    #[error("DSP error: {0}")]
    Dsp(#[from] CombError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything one run of the pipeline needs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Rate the filter runs at and the output is written at (Hz)
    pub sample_rate: u32,
    pub gain: f32,
    /// Delay in seconds
    pub delay_sec: f64,
    pub kind: CombKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let params = CombParams::default();
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            sample_rate: params.sample_rate,
            gain: params.gain,
            delay_sec: params.delay_sec,
            kind: CombKind::Fir,
        }
    }
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: CombKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_delay(mut self, delay_sec: f64) -> Self {
        self.delay_sec = delay_sec;
        self
    }

    pub fn params(&self) -> CombParams {
        CombParams::new(self.sample_rate, self.gain, self.delay_sec)
    }
}

/// What a pipeline run did.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub input_sample_rate: u32,
    pub output_sample_rate: u32,
    pub resampled: bool,
    pub num_channels: usize,
    /// Frames per channel written
    pub frames: usize,
    pub delay_samples: usize,
    /// Samples that saturated during 16-bit conversion
    pub clipped: usize,
}

/// Runs the configured filter over `config.input` and writes `config.output`.
///
/// The input is resampled to `config.sample_rate` first when the rates
/// differ, and the filter always runs on the resampled signal.
pub fn process_file(config: &PipelineConfig) -> PipelineResult<PipelineReport> {
    // Fail on bad parameters before touching any file
    let params = config.params();
    let delay_samples = params.validate()?;

    let decoded = read_wav(&config.input)?;
    log::info!(
        "decoded {}: {} channel(s), {} frames at {} Hz",
        config.input.display(),
        decoded.samples.num_channels(),
        decoded.samples.len(),
        decoded.sample_rate
    );

    let resampled = decoded.sample_rate != config.sample_rate;
    let signal = if resampled {
        log::info!(
            "resampling {} Hz -> {} Hz",
            decoded.sample_rate,
            config.sample_rate
        );
        resample(&decoded.samples, decoded.sample_rate, config.sample_rate)?
    } else {
        decoded.samples
    };

    let filtered = apply(config.kind, &signal, params)?;
    log::info!(
        "applied {} comb: gain {}, delay {} samples",
        config.kind,
        config.gain,
        delay_samples
    );

    let quantized = write_wav_i16(&config.output, &filtered, config.sample_rate)?;
    if quantized.clipped > 0 {
        log::warn!(
            "{} sample(s) clipped while writing {}",
            quantized.clipped,
            config.output.display()
        );
    }
    log::info!("wrote {}", config.output.display());

    Ok(PipelineReport {
        input_sample_rate: decoded.sample_rate,
        output_sample_rate: config.sample_rate,
        resampled,
        num_channels: filtered.num_channels(),
        frames: filtered.len(),
        delay_samples,
        clipped: quantized.clipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_run() {
        let config = PipelineConfig::new("in.wav", "out.wav");
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.gain, 0.5);
        assert_eq!(config.delay_sec, 0.25);
        assert_eq!(config.kind, CombKind::Fir);
        assert_eq!(config.params().delay_samples().unwrap(), 12_000);
    }

    #[test]
    fn test_bad_params_fail_before_io() {
        let config = PipelineConfig::new("/does/not/exist.wav", "out.wav").with_delay(-1.0);
        let err = process_file(&config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Dsp(CombError::InvalidParameter(_))
        ));

        let config = PipelineConfig::new("/does/not/exist.wav", "out.wav").with_gain(f32::NAN);
        assert!(matches!(process_file(&config), Err(PipelineError::Dsp(_))));
    }
}
