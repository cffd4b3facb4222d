use crate::MIN_TIME;

use super::RenderCtx;

/*
Gain Envelope
=============

A single linear ramp that can be restarted at any time. Reed voices have no
decay or sustain stage: the gain climbs to its target while the button is
held and falls back to zero when it is let go.

  gain
   G ┤      ______________
     │     /              \
     │    /                \
   0 ┼───/                  \───→ time
       attack   (held)    release

Retargeting
-----------

`ramp(from, to, seconds)` cancels whatever ramp is in flight and starts a new
one from `from`. Callers releasing a voice pass the *current* level as
`from`, so a release that lands in the middle of the attack starts where the
attack got to instead of jumping to the nominal peak first. That jump is an
audible click.

Interpolation
-------------

Like a release stage, each ramp snapshots its start level and length in
samples, then interpolates:

  level = start + (target - start) · elapsed / total

which lands exactly on the target after `total` samples regardless of
rounding in the per-sample step.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampState {
    Holding, // Level constant at the last target
    Ramping, // Interpolating towards the target
}

#[derive(Debug, Clone)]
pub struct GainEnvelope {
    level: f32,
    state: RampState,

    // Ramp bookkeeping, captured when the ramp starts
    start_level: f32,
    target: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl Default for GainEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl GainEnvelope {
    /// Silent and holding.
    pub fn new() -> Self {
        Self {
            level: 0.0,
            state: RampState::Holding,
            start_level: 0.0,
            target: 0.0,
            total_samples: 1,
            elapsed_samples: 0,
        }
    }

    /// Cancel any ramp in flight and move linearly from `from` to `to`.
    pub fn ramp(&mut self, from: f32, to: f32, seconds: f32, ctx: &RenderCtx) {
        self.start_level = from;
        self.level = from;
        self.target = to;
        self.total_samples = (seconds.max(MIN_TIME) * ctx.sample_rate).round().max(1.0) as u32;
        self.elapsed_samples = 0;
        self.state = RampState::Ramping;
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.state == RampState::Ramping {
            self.elapsed_samples = self.elapsed_samples.saturating_add(1);
            let progress = self.elapsed_samples as f32 / self.total_samples as f32;
            self.level = self.start_level + (self.target - self.start_level) * progress;

            if self.elapsed_samples >= self.total_samples {
                self.level = self.target;
                self.state = RampState::Holding;
            }
        }
        self.level
    }

    /// Multiply `buffer` by the envelope, advancing it one sample per frame.
    pub fn apply(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample();
        }
    }

    /// Instantaneous level.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn state(&self) -> RampState {
        self.state
    }

    /// True when holding at zero; nothing more will be heard.
    pub fn is_silent(&self) -> bool {
        self.state == RampState::Holding && self.level == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(SAMPLE_RATE, 440.0)
    }

    fn advance(env: &mut GainEnvelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn ramp_lands_exactly_on_target() {
        let mut env = GainEnvelope::new();
        env.ramp(0.0, 0.38, 0.02, &ctx());

        advance(&mut env, 10);
        assert!((env.level() - 0.19).abs() < 1e-6);
        assert_eq!(env.state(), RampState::Ramping);

        advance(&mut env, 10);
        assert_eq!(env.level(), 0.38);
        assert_eq!(env.state(), RampState::Holding);

        advance(&mut env, 100);
        assert_eq!(env.level(), 0.38);
    }

    #[test]
    fn release_mid_attack_starts_from_current_level() {
        let mut env = GainEnvelope::new();
        env.ramp(0.0, 1.0, 0.1, &ctx());
        advance(&mut env, 25);
        let mid = env.level();
        assert!((mid - 0.25).abs() < 1e-6);

        env.ramp(env.level(), 0.0, 0.1, &ctx());
        let first = env.next_sample();
        assert!(first < mid && first > mid - 0.01, "no jump: {first}");

        advance(&mut env, 100);
        assert!(env.is_silent());
    }

    #[test]
    fn apply_scales_buffer() {
        let mut env = GainEnvelope::new();
        env.ramp(0.5, 0.5, 0.001, &ctx());
        let mut buffer = vec![1.0; 8];
        env.apply(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn new_envelope_is_silent() {
        let mut env = GainEnvelope::new();
        assert!(env.is_silent());
        assert_eq!(env.next_sample(), 0.0);
    }
}
