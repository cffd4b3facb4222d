use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::RenderCtx;

/*
State-Variable Filter
=====================

A trapezoidal-integrated (topology-preserving) SVF. One structure yields the
low-pass and band-pass signals together; the filter type picks the mix.

| type      | output                     | use here                     |
| --------- | -------------------------- | ---------------------------- |
| low-pass  | v2                         | tame the saw partials        |
| bell      | x + k·(A² - 1)·v1          | resonant "body" boost        |

Parameters
----------

  cutoff_hz   corner (or centre, for bell) frequency
  q           resonance; k = 1 / q damps the loop
  gain_db     bell boost/cut; A = 10^(gain_db / 40), and k = 1 / (q·A) so the
              bandwidth stays symmetric between boost and cut

g is the prewarped integrator gain tan(π·fc / fs), which keeps the cutoff
where it was asked for even close to Nyquist.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowPass,
    Bell,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
    pub cutoff_hz: f32,
    pub q: f32,
    pub gain_db: f32,
    filter_type: FilterType,
}

const BUTTERWORTH_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: BUTTERWORTH_Q,
            gain_db: 0.0,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    /// Peaking boost (or cut, for negative `gain_db`) around `center_hz`.
    pub fn bell(center_hz: f32, gain_db: f32, q: f32) -> Self {
        Self {
            gain_db,
            ..Self::new(FilterType::Bell, center_hz).with_q(q)
        }
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.q = q.max(0.01);
        self
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        let nyquist_safe = self.cutoff_hz.clamp(1.0, ctx.sample_rate * 0.49);
        (TAU * nyquist_safe / (2.0 * ctx.sample_rate)).tan()
    }

    #[inline]
    fn bell_amplitude(&self) -> f32 {
        10.0_f32.powf(self.gain_db / 40.0)
    }

    #[inline]
    fn compute_k(&self) -> f32 {
        match self.filter_type {
            FilterType::Bell => 1.0 / (self.q * self.bell_amplitude()),
            FilterType::LowPass => 1.0 / self.q,
        }
    }

    /// Advance one sample; returns `(bandpass, lowpass)`.
    #[inline]
    fn tick(&mut self, sample: f32, k: f32, g: f32) -> (f32, f32) {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        (v1, v2)
    }

    /// Filter `buffer` in place.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = self.compute_k();
        let a_squared = self.bell_amplitude().powi(2);

        for sample in buffer.iter_mut() {
            let input = *sample;
            let (bandpass, lowpass) = self.tick(input, k, g);
            *sample = match self.filter_type {
                FilterType::LowPass => lowpass,
                FilterType::Bell => input + k * (a_squared - 1.0) * bandpass,
            }
        }
    }
}
