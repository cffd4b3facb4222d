//! TUI for acordeon
//!
//! Everything here reads the accordion through its snapshot and layout; the
//! only state of its own is the scope buffer and the spectrum analyzer.

mod keyboard;
mod spectrum;
mod status;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub use spectrum::SpectrumAnalyzer;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let snapshot = app.accordion.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Status
            Constraint::Length(5), // Melody rows
            Constraint::Length(3), // Bass
            Constraint::Min(8),    // Scope + spectrum
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    status::render_status(frame, chunks[0], app, &snapshot);
    keyboard::render_rows(frame, chunks[1], &app.accordion, &snapshot);
    keyboard::render_bass(frame, chunks[2], &app.accordion, &snapshot);

    let scopes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);
    waveform::render_waveform(frame, scopes[0], &app.scope_buffer);
    spectrum::render_spectrum(frame, scopes[1], app.spectrum.data());

    let bindings = app.accordion.bindings();
    let help = Paragraph::new(format!(
        " Open: {}  Close: {}  [Tab] Tonality  [Esc] Quit",
        bindings.open.join("/").to_uppercase(),
        bindings.close.join("/").to_uppercase(),
    ))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
