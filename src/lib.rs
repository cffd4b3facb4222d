//! Virtual diatonic button accordion.
//!
//! Keys map to melody buttons and bass buttons; a bellows direction picks
//! which of the two pitches each button sounds. The [`engine`] tracks held
//! controls and the bellows, and drives a [`synth::ToneBackend`] that does the
//! actual waveform synthesis.

#[cfg(feature = "serde")]
pub mod config;
pub mod dsp;
pub mod engine; // Bellows state machine, held controls, voice management
pub mod error;
pub mod io; // Normalized key events
pub mod pitch; // Note names to frequencies
pub mod synth; // Tone generation backend and reed voices
pub mod tonality;

pub use engine::{Accordion, AccordionSnapshot, BellowsDirection, Dispatch, EngineSettings, Handoff, Stroke};
pub use error::{Error, Result};
pub use io::{Edge, InputEvent};
pub use tonality::Tonality;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
