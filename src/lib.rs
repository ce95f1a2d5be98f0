//! FIR and IIR comb filters over mono or multi-channel audio buffers.
//!
//! ```
//! use combfx::{apply_fir, apply_iir, SampleBuffer};
//!
//! let mut impulse = vec![0.0; 10];
//! impulse[0] = 1.0;
//! let input = SampleBuffer::mono(impulse);
//!
//! // 10 Hz, 0.3 s -> a 3 sample delay
//! let fir = apply_fir(&input, 10, 0.5, 0.3)?;
//! let iir = apply_iir(&input, 10, 0.5, 0.3)?;
//!
//! assert_eq!(fir.channel(0).unwrap()[3], 0.5);
//! assert_eq!(iir.channel(0).unwrap()[9], 0.125);
//! # Ok::<(), combfx::CombError>(())
//! ```

pub mod buffer;
pub mod compare; // Difference signals and their plots
pub mod dsp;
pub mod error;
pub mod io;
pub mod pipeline; // Decode -> resample -> filter -> encode

/// Longest history a block filter will allocate per channel, in samples
/// (about 23 minutes at 48 kHz).
pub const MAX_DELAY_SAMPLES: usize = 1 << 26;

pub use buffer::SampleBuffer;
pub use dsp::comb::{apply, apply_fir, apply_iir, CombKind, CombParams};
pub use error::{CombError, CombResult};
pub use pipeline::{process_file, PipelineConfig, PipelineReport};
