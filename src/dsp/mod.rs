//! Low-level DSP primitives used by the reed voices.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside voice structs rendered from an audio callback.

/// Linear gain ramp that can be retargeted mid-flight.
pub mod envelope;
/// State-variable filter with low-pass and bell responses.
pub mod filter;
/// Periodic waveforms with detune.
pub mod oscillator;

pub use envelope::{GainEnvelope, RampState};
pub use filter::{FilterType, SVFilter};
pub use oscillator::{Oscillator, Waveform};

/// Context passed to primitives while rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
}

impl RenderCtx {
    pub fn from_freq(sample_rate: f32, frequency: f32) -> Self {
        Self {
            sample_rate,
            frequency,
        }
    }
}
