//! Spectrum of the mixed output
//!
//! Log-spaced bands over the accordion's range. Each band shows the loudest
//! FFT bin inside it, so a single reed reads as a clear peak even where the
//! bands are narrower than one bin.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const BANDS: usize = 64;
const LOW_HZ: f64 = 60.0;
const HIGH_HZ: f64 = 6_000.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin range per band, end exclusive
    bands: Vec<(usize, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (band index, level in dB)
    levels: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        // Hann
        let denom = fft_len.saturating_sub(1).max(1) as f32;
        let window = (0..fft_len)
            .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / denom).cos())
            .collect();

        let half = (fft_len / 2).max(1);
        let hz_per_bin = sample_rate as f64 / fft_len.max(1) as f64;
        let high = HIGH_HZ.min(sample_rate as f64 / 2.0).max(LOW_HZ);
        let edge = |i: usize| {
            let hz = LOW_HZ * (high / LOW_HZ).powf(i as f64 / BANDS as f64);
            ((hz / hz_per_bin).round() as usize).min(half - 1)
        };
        let bands = (0..BANDS)
            .map(|i| {
                let start = edge(i);
                (start, edge(i + 1).max(start + 1))
            })
            .collect();

        Self {
            window,
            bands,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            levels: (0..BANDS).map(|i| (i as f64, FLOOR_DB)).collect(),
        }
    }

    /// Recompute from the latest `samples`; ignored unless it is a full FFT frame.
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for ((_, level), &(start, end)) in self.levels.iter_mut().zip(&self.bands) {
            let peak = self.scratch[start..end]
                .iter()
                .map(|c| c.norm_sqr())
                .fold(1e-12f32, f32::max);
            *level = (10.0 * (peak as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.levels
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, levels: &[(f64, f64)]) {
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(levels);

    let title = format!(" Spectrum {LOW_HZ:.0} Hz - {:.0} kHz ", HIGH_HZ / 1000.0);
    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, BANDS as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 40.0])
                .labels(["-100", "-30", "40"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
