//! Sample rate conversion with a windowed-sinc resampler.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::buffer::SampleBuffer;
use crate::error::CombError;
use crate::io::AudioIoResult;

/// Frames handed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Converts `input` from `from_rate` to `to_rate`.
///
/// The output has `ceil(len * to_rate / from_rate)` frames and is aligned
/// with the input: the resampler's own latency is trimmed off the front.
/// Equal rates return a copy.
pub fn resample(input: &SampleBuffer, from_rate: u32, to_rate: u32) -> AudioIoResult<SampleBuffer> {
    if from_rate == 0 || to_rate == 0 {
        return Err(CombError::InvalidParameter(format!(
            "cannot resample from {} Hz to {} Hz",
            from_rate, to_rate
        ))
        .into());
    }
    if from_rate == to_rate || input.is_empty() || input.num_channels() == 0 {
        return Ok(input.clone());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let num_channels = input.num_channels();
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_params(), CHUNK_FRAMES, num_channels)?;

    let expected = (input.len() as u64 * to_rate as u64).div_ceil(from_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut out = vec![Vec::with_capacity(expected + delay); num_channels];

    let mut pos = 0;
    while pos < input.len() {
        let end = (pos + CHUNK_FRAMES).min(input.len());
        let chunk: Vec<&[f32]> = input.channels().iter().map(|c| &c[pos..end]).collect();
        let block = if end - pos == CHUNK_FRAMES {
            resampler.process(chunk.as_slice(), None)?
        } else {
            resampler.process_partial(Some(chunk.as_slice()), None)?
        };
        append(&mut out, block);
        pos = end;
    }

    // Flush the tail still sitting in the resampler
    while out[0].len() < expected + delay {
        let block = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if block.first().map_or(true, Vec::is_empty) {
            break;
        }
        append(&mut out, block);
    }

    for channel in &mut out {
        channel.drain(..delay.min(channel.len()));
        channel.truncate(expected);
    }

    log::debug!(
        "resampled {} frames at {} Hz to {} frames at {} Hz",
        input.len(),
        from_rate,
        out[0].len(),
        to_rate
    );

    Ok(SampleBuffer::from_channels(out)?)
}

fn append(out: &mut [Vec<f32>], block: Vec<Vec<f32>>) {
    for (channel, samples) in out.iter_mut().zip(block) {
        channel.extend(samples);
    }
}
