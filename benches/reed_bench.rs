//! Benchmarks for reed rendering and event dispatch.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*     Primitives inside one reed (oscillator, filters)
//!   - synth/*   One reed voice, and a bank playing a chord plus melody
//!   - engine/*  Dispatching key events with a silent backend

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use acordeon::{
    dsp::{Oscillator, RenderCtx, SVFilter},
    pitch,
    synth::{ReedBank, ReedVoice, ToneBackend, VoiceHandle},
    tonality::presets,
    Accordion, EngineSettings, InputEvent, Result,
};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 512];

fn bench_dsp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp");
    let ctx = RenderCtx::from_freq(SAMPLE_RATE, 293.66);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut saw = Oscillator::saw().with_detune(9.0);
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| saw.render(black_box(&mut buffer), &ctx))
        });

        let mut bell = SVFilter::bell(900.0, 3.5, 1.8);
        group.bench_with_input(BenchmarkId::new("bell", size), &size, |b, _| {
            b.iter(|| bell.render(black_box(&mut buffer), &ctx))
        });
    }

    group.finish();
}

fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut voice = ReedVoice::new(VoiceHandle::new(1), 293.66, SAMPLE_RATE);
        voice.ramp_gain(0.0, 0.38, 0.02);
        group.bench_with_input(BenchmarkId::new("reed_voice", size), &size, |b, _| {
            b.iter(|| voice.render(black_box(&mut buffer)))
        });

        // Three melody reeds over a bass chord.
        let mut bank = ReedBank::new(SAMPLE_RATE, 16);
        for note in ["D4", "F#4", "A4", "G3", "D4", "G4"] {
            let hz = pitch::resolve(note).unwrap_or(440.0);
            if let Ok(handle) = bank.create_voice(hz) {
                bank.ramp_gain(handle, 0.38, 0.38, 0.001);
            }
        }
        group.bench_with_input(BenchmarkId::new("bank_six_voices", size), &size, |b, _| {
            b.iter(|| bank.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}

/// Hands out handles and nothing else, so only the engine is measured.
struct Silent(u64);

impl ToneBackend for Silent {
    fn create_voice(&mut self, _frequency: f64) -> Result<VoiceHandle> {
        self.0 += 1;
        Ok(VoiceHandle::new(self.0))
    }
    fn ramp_gain(&mut self, _: VoiceHandle, _: f32, _: f32, _: f32) {}
    fn current_gain(&self, _: VoiceHandle) -> f32 {
        0.0
    }
    fn dispose_after(&mut self, _: VoiceHandle, _: f32) {}
    fn batch(&mut self, calls: &mut dyn FnMut(&mut dyn ToneBackend)) {
        calls(self)
    }
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    let mut acc = Accordion::new(presets::gcf(), Silent(0), EngineSettings::default())
        .expect("preset tonality is valid");
    acc.handle(&InputEvent::down("q"));

    let press = InputEvent::down("f5");
    let release = InputEvent::up("f5");
    group.bench_function("chord_press_release", |b| {
        b.iter(|| {
            acc.handle(black_box(&press));
            acc.handle(black_box(&release));
        })
    });

    group.bench_function("resolve_cached", |b| {
        b.iter(|| pitch::resolve(black_box("F#4")))
    });

    group.finish();
}

criterion_group!(benches, bench_dsp, bench_synth, bench_engine);
criterion_main!(benches);
