//! Status panel: tonality, bellows, voices

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use acordeon::{AccordionSnapshot, BellowsDirection};

use crate::app::App;

pub fn render_status(frame: &mut Frame, area: Rect, app: &App, snapshot: &AccordionSnapshot) {
    let (bellows, bellows_color) = match snapshot.bellows {
        BellowsDirection::Idle => ("· IDLE ·", Color::DarkGray),
        BellowsDirection::Open => ("<< OPEN >>", Color::Green),
        BellowsDirection::Close => (">> CLOSE <<", Color::Magenta),
    };
    let owner = snapshot
        .bellows_owner
        .as_deref()
        .map(|key| format!(" ({})", key.to_uppercase()))
        .unwrap_or_default();

    let audio = if snapshot.degraded {
        Span::styled("no audio", Style::default().fg(Color::Red))
    } else {
        Span::styled("audio ok", Style::default().fg(Color::Green))
    };
    let input = if app.enhanced { "key release" } else { "timed release" };

    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(vec![
            Span::styled("Tonality ", label),
            Span::styled(
                app.accordion.tonality().display_label().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Bellows ", label),
            Span::styled(
                format!("{bellows}{owner}"),
                Style::default().fg(bellows_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Held ", label),
            Span::raw(format!("{} + {} bass", snapshot.melody.len(), snapshot.bass.len())),
            Span::styled("   Voices ", label),
            Span::raw(snapshot.live_voices.to_string()),
            Span::raw("   "),
            audio,
            Span::styled(format!("   {input}   "), label),
            Span::raw(app.status.as_str()),
        ]),
    ];

    let block = Block::default().title(" Acordeón ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
