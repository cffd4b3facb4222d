// Purpose: tone generation behind the engine
// The engine speaks to a ToneBackend; ReedBank is the sample-rendering one.

pub mod backend;
pub mod bank;
pub mod voice;

pub use backend::{ToneBackend, VoiceHandle};
pub use bank::{ReedBank, SharedReedBank};
pub use voice::{Partial, ReedVoice, VoiceState, REED_PARTIALS};
