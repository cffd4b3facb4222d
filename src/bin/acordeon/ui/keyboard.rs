//! Button rows and bass panel

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use acordeon::{
    tonality::{Control, Voicing},
    Accordion, AccordionSnapshot, Stroke,
};

/// One button: key label plus what it plays right now.
///
/// With the bellows at rest both strokes are shown as `open/close`.
fn button(control: &Control, snapshot: &AccordionSnapshot, sounding: bool) -> Span<'static> {
    let text = match snapshot.bellows.stroke() {
        Some(stroke) => format!(" {} {} ", control.label, control.stroke_label(stroke)),
        None => format!(
            " {} {}/{} ",
            control.label,
            control.stroke_label(Stroke::Open),
            control.stroke_label(Stroke::Close)
        ),
    };

    let held = snapshot
        .melody
        .iter()
        .chain(snapshot.bass.iter())
        .any(|id| *id == control.id);
    let style = match (held, sounding) {
        (true, true) => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::Black).bg(Color::Yellow),
        _ => match control.voicing {
            Voicing::Reed { .. } => Style::default().fg(Color::White),
            Voicing::Chord { .. } => Style::default().fg(Color::Cyan),
        },
    };
    Span::styled(text, style)
}

pub fn render_rows(frame: &mut Frame, area: Rect, accordion: &Accordion, snapshot: &AccordionSnapshot) {
    let layout = accordion.layout();

    // Inner row on top, as seen by the player.
    let lines: Vec<Line> = layout
        .rows()
        .iter()
        .rev()
        .map(|row| {
            let mut spans = vec![Span::styled(
                format!("{:>6} ", row.title),
                Style::default().fg(Color::DarkGray),
            )];
            spans.extend(layout.row_controls(row).map(|control| {
                let sounding = accordion.voices().entry(control.id.as_str()).is_some();
                button(control, snapshot, sounding)
            }));
            Line::from(spans)
        })
        .collect();

    let block = Block::default().title(" Melody ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_bass(frame: &mut Frame, area: Rect, accordion: &Accordion, snapshot: &AccordionSnapshot) {
    let spans: Vec<Span> = accordion
        .layout()
        .bass()
        .map(|control| {
            let sounding = accordion.voices().entry(control.id.as_str()).is_some();
            button(control, snapshot, sounding)
        })
        .collect();

    let block = Block::default().title(" Bass ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
