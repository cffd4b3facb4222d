//! Event loop: terminal keys in, accordion events out

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use acordeon::{io::normalize_key, Accordion, Edge, InputEvent, Tonality};

use crate::{audio::AudioOutput, ui};

/// Without release events a key counts as up once its auto-repeat stops.
const FALLBACK_RELEASE_THRESHOLD: Duration = Duration::from_millis(600);

/// Samples shown in the scope; also the FFT size.
pub const SCOPE_LEN: usize = 2048;

pub struct App {
    pub accordion: Accordion,
    pub tonalities: Vec<Tonality>,
    pub tonality_index: usize,
    pub enhanced: bool,
    pub scope_buffer: Vec<f32>,
    pub spectrum: ui::SpectrumAnalyzer,
    pub status: String,
    output: Option<AudioOutput>,
    /// Fallback mode only: when each held key was last reported.
    last_seen: BTreeMap<String, Instant>,
    should_quit: bool,
}

impl App {
    pub fn new(
        accordion: Accordion,
        tonalities: Vec<Tonality>,
        output: Option<AudioOutput>,
        enhanced: bool,
    ) -> Self {
        let tonality_index = tonalities
            .iter()
            .position(|t| t.name == accordion.tonality().name)
            .unwrap_or(0);
        let sample_rate = output.as_ref().map_or(48_000.0, |o| o.sample_rate);
        let status = if output.is_some() {
            "Ready".to_string()
        } else {
            "No audio output: keys are tracked but nothing sounds".to_string()
        };

        Self {
            accordion,
            tonalities,
            tonality_index,
            enhanced,
            scope_buffer: vec![0.0; SCOPE_LEN],
            spectrum: ui::SpectrumAnalyzer::new(SCOPE_LEN, sample_rate),
            status,
            output,
            last_seen: BTreeMap::new(),
            should_quit: false,
        }
    }

    pub fn run(mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if !self.enhanced {
                self.tick_fallback_release();
            }
            self.poll_scope();

            terminal.draw(|frame| ui::draw(frame, &self))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn poll_scope(&mut self) {
        let Some(output) = self.output.as_mut() else {
            return;
        };

        let mut fresh = 0;
        while let Ok(sample) = output.scope.pop() {
            self.scope_buffer.push(sample);
            fresh += 1;
        }
        if fresh == 0 {
            return;
        }
        if self.scope_buffer.len() > SCOPE_LEN {
            let excess = self.scope_buffer.len() - SCOPE_LEN;
            self.scope_buffer.drain(..excess);
        }
        self.spectrum.update(&self.scope_buffer);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Press {
            match key.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Tab => {
                    self.cycle_tonality();
                    return;
                }
                _ => {}
            }
        }

        let Some(raw) = raw_key_name(key.code) else {
            return;
        };
        let Some(symbol) = normalize_key(&raw) else {
            return;
        };

        let event = match (key.kind, self.enhanced) {
            (KeyEventKind::Press, true) => InputEvent::down(symbol),
            (KeyEventKind::Repeat, _) => InputEvent::repeat(symbol),
            (KeyEventKind::Release, _) => InputEvent::up(symbol),
            // Auto-repeat arrives as more presses; only the first one counts.
            (KeyEventKind::Press, false) => {
                let repeat = self.last_seen.insert(symbol.clone(), Instant::now()).is_some();
                InputEvent {
                    key: symbol,
                    edge: Edge::Down,
                    repeat,
                }
            }
        };
        self.accordion.handle(&event);
    }

    fn tick_fallback_release(&mut self) {
        let now = Instant::now();
        let stale: Vec<String> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now.duration_since(**seen) >= FALLBACK_RELEASE_THRESHOLD)
            .map(|(key, _)| key.clone())
            .collect();

        for key in stale {
            self.last_seen.remove(&key);
            self.accordion.handle(&InputEvent::up(key));
        }
    }

    fn cycle_tonality(&mut self) {
        if self.tonalities.is_empty() {
            return;
        }
        self.tonality_index = (self.tonality_index + 1) % self.tonalities.len();
        let next = self.tonalities[self.tonality_index].clone();
        let label = next.display_label().to_string();

        match self.accordion.set_tonality(next) {
            Ok(()) => {
                info!(tonality = %label, "switched tonality");
                self.status = format!("Tonality: {label}");
            }
            Err(err) => {
                warn!(%err, "cannot switch tonality");
                self.status = err.to_string();
            }
        }
    }
}

/// Name of `code` as the keymap expects it; `None` for keys it has no use for.
fn raw_key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::F(n) => Some(format!("F{n}")),
        _ => None,
    }
}
