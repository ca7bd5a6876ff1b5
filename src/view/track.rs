//! Current track panel

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use podlink::Accessory;

use super::utils::truncate_string;

fn field<'a>(label: &'a str, value: Option<&str>, width: usize) -> Line<'a> {
    let (text, style) = match value {
        Some(value) => (truncate_string(value, width), Style::default().fg(Color::White)),
        None => ("-".to_string(), Style::default().fg(Color::DarkGray)),
    };
    Line::from(vec![
        Span::styled(format!("{:>9} ", label), Style::default().fg(Color::Yellow)),
        Span::styled(text, style),
    ])
}

pub fn render_track_panel(frame: &mut Frame, area: Rect, link: &Accessory) {
    let width = area.width.saturating_sub(16) as usize;
    let position = link.current_track_position().map(|p| format!("#{}", p));

    let lines = vec![
        field("Position", position.as_deref(), width),
        field("Title", link.current_title(), width),
        field("Artist", link.current_artist(), width),
        field("Album", link.current_album(), width),
        Line::raw(""),
        Line::from(vec![
            Span::styled(format!("{:>9} ", "Sequence"), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:?}", link.sequence_state()),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Track ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(panel, area);
}
