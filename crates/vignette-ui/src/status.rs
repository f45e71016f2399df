use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use vignette_core::phase::Phase;

/// Snapshot of coordinator state for one frame.
pub struct StatusView<'a> {
    pub visible_phase: Option<Phase>,
    pub pending: &'a str,
    pub mode: &'a str,
    pub animation: Phase,
    pub generation: u64,
    pub on_screen: bool,
    pub rendered: bool,
    pub configuring: bool,
    /// Most recent `state` events, newest last.
    pub history: &'a [Phase],
}

/// Draw the phase strip: one cell per phase, the visible one highlighted.
pub fn render_stage(f: &mut Frame, area: Rect, view: &StatusView<'_>) {
    let mut spans = Vec::with_capacity(Phase::COUNT * 2);
    for phase in Phase::ALL {
        let style = if view.visible_phase == Some(phase) {
            Style::default()
                .fg(Color::Black)
                .bg(phase_color(phase))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {:^8} ", phase.as_str()), style));
        spans.push(Span::raw(" "));
    }

    let history: Vec<Span> = view
        .history
        .iter()
        .map(|phase| Span::styled(format!("{phase} "), Style::default().fg(phase_color(*phase))))
        .collect();

    let lines = vec![
        Line::from(""),
        Line::from(spans),
        Line::from(""),
        Line::from(Span::styled("state events:", Style::default().fg(Color::Gray))),
        Line::from(history),
    ];

    let block = Block::default().borders(Borders::ALL).title(" STAGE ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draw the key/value status panel.
pub fn render_status(f: &mut Frame, area: Rect, view: &StatusView<'_>) {
    let visible = view
        .visible_phase
        .map(|phase| phase.to_string())
        .unwrap_or_else(|| "-".to_string());
    let generation = view.generation.to_string();
    let animation = view.animation.to_string();
    let rows = [
        ("visible", visible.as_str()),
        ("pending", view.pending),
        ("mode", view.mode),
        ("animation", animation.as_str()),
        ("generation", generation.as_str()),
        ("on screen", yes_no(view.on_screen)),
        ("rendered", yes_no(view.rendered)),
        ("configuring", yes_no(view.configuring)),
    ];

    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!(" {key:<12}"), Style::default().fg(Color::Gray)),
                Span::styled(value.to_string(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" STATUS ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Entrance => Color::Cyan,
        Phase::Loop => Color::Green,
        Phase::Action => Color::Magenta,
    }
}
