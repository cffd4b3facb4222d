use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::RenderCtx;

/*
Oscillator
==========

A phase accumulator in [0, 1) advanced by frequency / sample_rate each
sample, shaped into a waveform:

  Sine      sin(2π·phase)                   fundamental only
  Saw       2·phase - 1, PolyBLEP corrected all harmonics, 1/n
  Triangle  1 - 4·|phase - 0.5|             odd harmonics, 1/n²

The saw's jump from +1 to -1 aliases badly at high pitches. PolyBLEP
subtracts a two-sample polynomial residual around the discontinuity, which
is enough for reed tones that get low-passed afterwards anyway.

Detune is in cents; 100 cents = 1 semitone, ratio = 2^(cents/1200).
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
    detune_ratio: f32,
}

#[inline]
fn poly_blep(phase: f32, dt: f32) -> f32 {
    if phase < dt {
        let t = phase / dt;
        t + t - t * t - 1.0
    } else if phase > 1.0 - dt {
        let t = (phase - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            detune_ratio: 1.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn saw() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    /// Offset the pitch by `cents`.
    pub fn with_detune(mut self, cents: f32) -> Self {
        self.detune_ratio = 2.0_f32.powf(cents / 1200.0);
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        let dt = (ctx.frequency * self.detune_ratio / ctx.sample_rate).clamp(0.0, 0.5);
        let phase = self.phase;

        let sample = match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Saw => 2.0 * phase - 1.0 - poly_blep(phase, dt),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }

    /// Overwrite `out` with the waveform.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
