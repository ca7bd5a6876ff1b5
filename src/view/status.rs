//! Link status bar

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use podlink::Mode;

use crate::bench::Bench;

fn mode_color(mode: Mode) -> Color {
    match mode {
        Mode::Unknown => Color::DarkGray,
        Mode::Simple => Color::Cyan,
        Mode::SwitchingToAdvanced => Color::Yellow,
        Mode::Advanced => Color::Green,
    }
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, bench: &Bench) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Link
            Constraint::Length(30), // Accessory
        ])
        .split(area);

    let link = &bench.link;
    let mode = link.mode();

    let deadline = match link.liveness_remaining_ms() {
        Some(ms) => format!("deadline {} ms, missed {}", ms, link.missed_deadlines()),
        None => "no deadline".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(format!("{:?}", mode), Style::default().fg(mode_color(mode))),
        Span::raw(format!(
            "  codec {:?}  want {:?}  {}",
            link.dialect(),
            link.desired_dialect(),
            deadline
        )),
    ]);

    let status = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Link ")
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(mode_color(mode))),
    );
    frame.render_widget(status, chunks[0]);

    let (text, color) = match (bench.pod.is_attached(), bench.pod.is_responsive()) {
        (false, _) => ("unplugged", Color::DarkGray),
        (true, true) => ("plugged in", Color::Cyan),
        (true, false) => ("plugged in, muted", Color::Red),
    };
    let accessory = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(" Accessory "));
    frame.render_widget(accessory, chunks[1]);
}
