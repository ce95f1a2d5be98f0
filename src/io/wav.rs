//! WAV decoding and 16-bit encoding.

use std::path::Path;

use crate::buffer::SampleBuffer;
use crate::io::quantize::{quantize_i16, Quantized};
use crate::io::{AudioIoError, AudioIoResult};

/// Decoded audio and the rate it was recorded at.
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub samples: SampleBuffer,
    pub sample_rate: u32,
}

fn wav_error(path: &Path) -> impl FnOnce(hound::Error) -> AudioIoError + '_ {
    move |source| AudioIoError::Wav {
        path: path.display().to_string(),
        source,
    }
}

/// Reads a WAV file into floats.
///
/// Integer PCM is divided by `2^(bits - 1)`, float PCM is taken as-is.
pub fn read_wav<P: AsRef<Path>>(path: P) -> AudioIoResult<WavAudio> {
    let path = path.as_ref();
    if let Some(ext) = path.extension() {
        if !ext.eq_ignore_ascii_case("wav") && !ext.eq_ignore_ascii_case("wave") {
            return Err(AudioIoError::UnsupportedFormat(format!(
                "{}: only WAV files are supported",
                path.display()
            )));
        }
    }

    let reader = hound::WavReader::open(path).map_err(wav_error(path))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(wav_error(path))?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(wav_error(path))?
        }
    };

    let samples = SampleBuffer::from_interleaved(&interleaved, spec.channels as usize)?;
    log::debug!(
        "read {}: {} channel(s) x {} frames at {} Hz ({}-bit {:?})",
        path.display(),
        samples.num_channels(),
        samples.len(),
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    Ok(WavAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes `buffer` as 16-bit PCM at `sample_rate`. Returns the quantized
/// samples so callers can report clipping.
pub fn write_wav_i16<P: AsRef<Path>>(
    path: P,
    buffer: &SampleBuffer,
    sample_rate: u32,
) -> AudioIoResult<Quantized> {
    let path = path.as_ref();
    let channels = u16::try_from(buffer.num_channels())
        .ok()
        .filter(|&c| c > 0)
        .ok_or_else(|| {
            AudioIoError::UnsupportedFormat(format!(
                "{}: cannot write {} channels",
                path.display(),
                buffer.num_channels()
            ))
        })?;

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let quantized = quantize_i16(buffer);
    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_error(path))?;
    for &sample in &quantized.samples {
        writer.write_sample(sample).map_err(wav_error(path))?;
    }
    writer.finalize().map_err(wav_error(path))?;

    Ok(quantized)
}
