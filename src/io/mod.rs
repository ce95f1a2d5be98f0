// Purpose - external interfaces, format conversions

pub mod quantize;
pub mod resample;
pub mod wav;

use thiserror::Error;

use crate::error::CombError;

/// Errors from reading, writing or converting audio.
#[derive(Error, Debug)]
pub enum AudioIoError {
    #[error("WAV error in {path}: {source}")]
    Wav {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Resampler setup failed: {0}")]
    ResamplerSetup(#[from] rubato::ResamplerConstructionError),

    #[error("Resampling failed: {0}")]
    Resample(#[from] rubato::ResampleError),

    #[error(transparent)]
    Dsp(#[from] CombError),
}

pub type AudioIoResult<T> = Result<T, AudioIoError>;
