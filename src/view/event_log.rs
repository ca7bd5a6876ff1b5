//! Event log rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::bench::Bench;
use super::utils::format_sim_time;

pub fn render_event_log(frame: &mut Frame, area: Rect, bench: &Bench) {
    // Newest entries at the bottom; only as many as fit
    let visible = area.height.saturating_sub(2) as usize;
    let skip = bench.log.len().saturating_sub(visible);

    let items: Vec<ListItem> = bench
        .log
        .iter()
        .skip(skip)
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.at.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format_sim_time(entry.sim_ms), Style::default().fg(Color::Blue)),
                Span::raw("  "),
                Span::raw(entry.text.clone()),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Events "));
    frame.render_widget(list, area);
}
