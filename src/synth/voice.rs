use crate::dsp::{GainEnvelope, Oscillator, RenderCtx, SVFilter, Waveform};

use super::VoiceHandle;

/*
Reed Voice
==========

One accordion reed, as a fixed graph:

  saw   (  0 ct) × 0.48 ─┐
  saw   ( +9 ct) × 0.26 ─┼─→ low-pass 2400 Hz ─→ bell 900 Hz +3.5 dB ─→ gain
  tri   ( -7 ct) × 0.18 ─┘       Q 0.9              Q 1.8            envelope

The two saws beating against each other give the "wet" double-reed shimmer
of a tremolo-tuned accordion; the triangle fills in the body. The low-pass
takes the fizz off the saws and the bell adds the boxy mid resonance of the
instrument's chambers.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub waveform: Waveform,
    pub detune_cents: f32,
    pub gain: f32,
}

pub const REED_PARTIALS: [Partial; 3] = [
    Partial {
        waveform: Waveform::Saw,
        detune_cents: 0.0,
        gain: 0.48,
    },
    Partial {
        waveform: Waveform::Saw,
        detune_cents: 9.0,
        gain: 0.26,
    },
    Partial {
        waveform: Waveform::Triangle,
        detune_cents: -7.0,
        gain: 0.18,
    },
];

pub const TONE_CUTOFF_HZ: f32 = 2400.0;
pub const TONE_Q: f32 = 0.9;
pub const BODY_CENTER_HZ: f32 = 900.0;
pub const BODY_GAIN_DB: f32 = 3.5;
pub const BODY_Q: f32 = 1.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Active,    // Sounding, no teardown scheduled
    Disposing, // Keeps rendering until the deadline
    Finished,  // Deadline passed, ready to drop
}

pub struct ReedVoice {
    handle: VoiceHandle,
    ctx: RenderCtx,
    oscillators: [(Oscillator, f32); 3],
    tone: SVFilter,
    body: SVFilter,
    gain: GainEnvelope,
    state: VoiceState,
    /// Samples left before teardown, once disposal is scheduled.
    dispose_in: u64,
}

impl ReedVoice {
    pub fn new(handle: VoiceHandle, frequency: f32, sample_rate: f32) -> Self {
        let oscillators = REED_PARTIALS.map(|partial| {
            (
                Oscillator::new(partial.waveform).with_detune(partial.detune_cents),
                partial.gain,
            )
        });

        Self {
            handle,
            ctx: RenderCtx::from_freq(sample_rate, frequency),
            oscillators,
            tone: SVFilter::lowpass(TONE_CUTOFF_HZ).with_q(TONE_Q),
            body: SVFilter::bell(BODY_CENTER_HZ, BODY_GAIN_DB, BODY_Q),
            gain: GainEnvelope::new(),
            state: VoiceState::Active,
            dispose_in: 0,
        }
    }

    pub fn handle(&self) -> VoiceHandle {
        self.handle
    }

    pub fn frequency(&self) -> f32 {
        self.ctx.frequency
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn gain(&self) -> f32 {
        self.gain.level()
    }

    pub fn ramp_gain(&mut self, from: f32, target: f32, seconds: f32) {
        self.gain.ramp(from, target, seconds, &self.ctx);
    }

    pub fn dispose_after(&mut self, seconds: f32) {
        self.dispose_in = (seconds.max(0.0) * self.ctx.sample_rate).round() as u64;
        self.state = if self.dispose_in == 0 {
            VoiceState::Finished
        } else {
            VoiceState::Disposing
        };
    }

    pub fn is_finished(&self) -> bool {
        self.state == VoiceState::Finished
    }

    /// Overwrite `out` with this voice's output.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.is_finished() {
            out.fill(0.0);
            return;
        }

        for sample in out.iter_mut() {
            *sample = self
                .oscillators
                .iter_mut()
                .map(|(osc, gain)| osc.next_sample(&self.ctx) * *gain)
                .sum();
        }

        self.tone.render(out, &self.ctx);
        self.body.render(out, &self.ctx);
        self.gain.apply(out);

        if self.state == VoiceState::Disposing {
            self.dispose_in = self.dispose_in.saturating_sub(out.len() as u64);
            if self.dispose_in == 0 {
                self.state = VoiceState::Finished;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn silent_until_gain_ramps() {
        let mut voice = ReedVoice::new(VoiceHandle::new(1), 293.66, SAMPLE_RATE);
        let mut buffer = vec![0.0; 512];
        voice.render(&mut buffer);
        assert_eq!(peak(&buffer), 0.0);

        voice.ramp_gain(0.0, 0.38, 0.02);
        let mut buffer = vec![0.0; 2048];
        voice.render(&mut buffer);
        assert!(peak(&buffer) > 0.05);
        assert!(peak(&buffer) < 1.0);
        assert!((voice.gain() - 0.38).abs() < 1e-6);
    }

    #[test]
    fn disposal_waits_for_deadline() {
        let mut voice = ReedVoice::new(VoiceHandle::new(1), 440.0, SAMPLE_RATE);
        voice.ramp_gain(0.0, 0.38, 0.02);
        voice.ramp_gain(voice.gain(), 0.0, 0.18);
        voice.dispose_after(0.23);
        assert_eq!(voice.state(), VoiceState::Disposing);

        let mut buffer = vec![0.0; 1024];
        let deadline = (0.23 * SAMPLE_RATE) as usize;
        let mut rendered = 0;
        while rendered + buffer.len() < deadline {
            voice.render(&mut buffer);
            rendered += buffer.len();
            assert!(!voice.is_finished());
        }

        voice.render(&mut buffer);
        assert!(voice.is_finished());
    }

    #[test]
    fn recipe_is_fixed() {
        let gains: Vec<f32> = REED_PARTIALS.iter().map(|p| p.gain).collect();
        assert_eq!(gains, [0.48, 0.26, 0.18]);
        assert_eq!(REED_PARTIALS[2].waveform, Waveform::Triangle);
    }
}
