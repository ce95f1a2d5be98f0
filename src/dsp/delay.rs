use crate::MAX_DELAY_SAMPLES;

/// Circular history of the most recent samples written to it.
///
/// `read(d)` returns the sample written `d` writes ago, for
/// `1 <= d <= max_delay()`. Anything older than what has been written reads as
/// silence.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// `max_delay_samples` is clamped to [`MAX_DELAY_SAMPLES`].
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.min(MAX_DELAY_SAMPLES) + 1],
            write_pos: 0,
        }
    }

    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay_samples = delay_samples.min(len - 1);
        let read_pos = (self.write_pos + len - delay_samples) % len;
        self.buffer[read_pos]
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
