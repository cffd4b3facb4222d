use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
#[cfg(feature = "rtrb")]
use rtrb::Producer;

use crate::{
    error::{Error, Result},
    synth::{voice::ReedVoice, ToneBackend, VoiceHandle},
    MAX_BLOCK_SIZE,
};

pub const DEFAULT_MAX_VOICES: usize = 64;
pub const DEFAULT_MASTER_GAIN: f32 = 0.85;

/// Renders every allocated reed voice into one mono stream.
///
/// Voices are addressed by handle and live until their disposal deadline
/// passes during rendering. Handles are never reused.
pub struct ReedBank {
    sample_rate: f32,
    max_voices: usize,
    master_gain: f32,
    voices: Vec<ReedVoice>,
    next_handle: u64,
    temp_buffer: Vec<f32>,
    #[cfg(feature = "rtrb")]
    scope: Option<Producer<f32>>,
}

impl ReedBank {
    pub fn new(sample_rate: f32, max_voices: usize) -> Self {
        Self {
            sample_rate,
            max_voices,
            master_gain: DEFAULT_MASTER_GAIN,
            voices: Vec::with_capacity(max_voices),
            next_handle: 1,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            #[cfg(feature = "rtrb")]
            scope: None,
        }
    }

    pub fn with_master_gain(mut self, gain: f32) -> Self {
        self.master_gain = gain.max(0.0);
        self
    }

    /// Copy every rendered sample into `tx` for visualization. Samples are
    /// dropped when the consumer falls behind.
    #[cfg(feature = "rtrb")]
    pub fn with_scope(mut self, tx: Producer<f32>) -> Self {
        self.scope = Some(tx);
        self
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Voices still allocated, fading ones included.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn contains(&self, handle: VoiceHandle) -> bool {
        self.voice(handle).is_some()
    }

    fn voice(&self, handle: VoiceHandle) -> Option<&ReedVoice> {
        self.voices.iter().find(|v| v.handle() == handle)
    }

    fn voice_mut(&mut self, handle: VoiceHandle) -> Option<&mut ReedVoice> {
        self.voices.iter_mut().find(|v| v.handle() == handle)
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            let temp = &mut self.temp_buffer[..block.len()];
            for voice in &mut self.voices {
                voice.render(temp);
                for (o, v) in block.iter_mut().zip(temp.iter()) {
                    *o += v;
                }
            }

            for sample in block.iter_mut() {
                *sample = (*sample * self.master_gain).clamp(-1.0, 1.0);
            }

            #[cfg(feature = "rtrb")]
            if let Some(tx) = self.scope.as_mut() {
                for &sample in block.iter() {
                    if tx.push(sample).is_err() {
                        break;
                    }
                }
            }

            self.voices.retain(|v| !v.is_finished());
        }
    }
}

impl ToneBackend for ReedBank {
    fn create_voice(&mut self, frequency: f64) -> Result<VoiceHandle> {
        if self.voices.len() >= self.max_voices {
            return Err(Error::AudioBackendUnavailable(format!(
                "all {} voices in use",
                self.max_voices
            )));
        }

        let handle = VoiceHandle::new(self.next_handle);
        self.next_handle += 1;
        self.voices
            .push(ReedVoice::new(handle, frequency as f32, self.sample_rate));
        Ok(handle)
    }

    fn ramp_gain(&mut self, handle: VoiceHandle, from: f32, target: f32, seconds: f32) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.ramp_gain(from, target, seconds);
        }
    }

    fn current_gain(&self, handle: VoiceHandle) -> f32 {
        self.voice(handle).map(ReedVoice::gain).unwrap_or(0.0)
    }

    fn dispose_after(&mut self, handle: VoiceHandle, seconds: f32) {
        if let Some(voice) = self.voice_mut(handle) {
            voice.dispose_after(seconds);
        }
    }

    fn batch(&mut self, calls: &mut dyn FnMut(&mut dyn ToneBackend)) {
        calls(self)
    }
}

/// [`ReedBank`] shared between the control thread and an audio callback.
#[derive(Clone)]
pub struct SharedReedBank(Arc<Mutex<ReedBank>>);

impl SharedReedBank {
    pub fn new(bank: ReedBank) -> Self {
        Self(Arc::new(Mutex::new(bank)))
    }

    pub fn lock(&self) -> MutexGuard<'_, ReedBank> {
        self.0.lock()
    }

    pub fn render_block(&self, out: &mut [f32]) {
        self.0.lock().render_block(out);
    }
}

impl ToneBackend for SharedReedBank {
    fn create_voice(&mut self, frequency: f64) -> Result<VoiceHandle> {
        self.0.lock().create_voice(frequency)
    }

    fn ramp_gain(&mut self, handle: VoiceHandle, from: f32, target: f32, seconds: f32) {
        self.0.lock().ramp_gain(handle, from, target, seconds)
    }

    fn current_gain(&self, handle: VoiceHandle) -> f32 {
        self.0.lock().current_gain(handle)
    }

    fn dispose_after(&mut self, handle: VoiceHandle, seconds: f32) {
        self.0.lock().dispose_after(handle, seconds)
    }

    /// Holds the lock for the whole batch, so the audio callback renders
    /// either before or after it.
    fn batch(&mut self, calls: &mut dyn FnMut(&mut dyn ToneBackend)) {
        let mut bank = self.0.lock();
        calls(&mut *bank)
    }
}
