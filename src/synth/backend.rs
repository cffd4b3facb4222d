use crate::error::Result;

/// Opaque reference to one voice allocated by a [`ToneBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(u64);

impl VoiceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Capability the voice engine needs from whatever makes the sound.
///
/// The engine only schedules gain changes; it never waits for them. Times
/// are in seconds from "now" on the backend's own clock, and every call made
/// inside one [`ToneBackend::batch`] shares the same "now".
pub trait ToneBackend {
    /// Allocate the fixed reed graph at `frequency` Hz, already running at
    /// zero gain.
    ///
    /// Fails with [`crate::Error::AudioBackendUnavailable`] when no voice can
    /// be allocated.
    fn create_voice(&mut self, frequency: f64) -> Result<VoiceHandle>;

    /// Cancel any ramp in flight and move the voice gain linearly from
    /// `from` to `target` over `seconds`.
    fn ramp_gain(&mut self, handle: VoiceHandle, from: f32, target: f32, seconds: f32);

    /// Gain at this instant, mid-ramp included. Unknown handles read as 0.
    fn current_gain(&self, handle: VoiceHandle) -> f32;

    /// Tear the voice down once `seconds` have elapsed.
    fn dispose_after(&mut self, handle: VoiceHandle, seconds: f32);

    /// Run `calls` so that no audio is rendered between any two of them.
    ///
    /// A chord's notes are created, ramped and released inside one batch so
    /// they start and stop on the same frame.
    fn batch(&mut self, calls: &mut dyn FnMut(&mut dyn ToneBackend));
}

impl<B: ToneBackend + ?Sized> ToneBackend for Box<B> {
    fn create_voice(&mut self, frequency: f64) -> Result<VoiceHandle> {
        (**self).create_voice(frequency)
    }

    fn ramp_gain(&mut self, handle: VoiceHandle, from: f32, target: f32, seconds: f32) {
        (**self).ramp_gain(handle, from, target, seconds)
    }

    fn current_gain(&self, handle: VoiceHandle) -> f32 {
        (**self).current_gain(handle)
    }

    fn dispose_after(&mut self, handle: VoiceHandle, seconds: f32) {
        (**self).dispose_after(handle, seconds)
    }

    fn batch(&mut self, calls: &mut dyn FnMut(&mut dyn ToneBackend)) {
        (**self).batch(calls)
    }
}
