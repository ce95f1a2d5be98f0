//! Signal-processing core.
//!
//! `comb` is the whole-buffer engine everything else is built around. `block`
//! runs the same recurrence incrementally on top of `delay`, and `response`
//! measures what a given configuration does to each frequency.

/// Stateful, block-at-a-time comb filter.
pub mod block;
/// FIR and IIR comb filters over whole buffers.
pub mod comb;
/// Circular sample history.
pub mod delay;
/// FFT-based magnitude response.
pub mod response;

pub use block::{CombFilter, FilterParam};
pub use comb::{apply, apply_fir, apply_iir, delay_samples, process_into, CombKind, CombParams};
