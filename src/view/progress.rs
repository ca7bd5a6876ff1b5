//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use podlink::{Accessory, PlaybackState};

use super::utils::format_duration;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, link: &Accessory) {
    let symbol = match link.current_playback_state() {
        PlaybackState::Playing => "▶",
        PlaybackState::Paused => "⏸",
        PlaybackState::Stopped => "■",
        PlaybackState::Unknown => "?",
    };

    let status_text = match link.current_title() {
        Some(title) => format!(
            " {} {} | {} ({}) ",
            symbol,
            title,
            link.current_artist().unwrap_or("-"),
            link.current_album().unwrap_or("-")
        ),
        None => format!(" {} No track information ", symbol),
    };

    let elapsed = link.elapsed_ms();
    let length = link.track_length_ms();
    let time_str = format!("{} / {}", format_duration(elapsed), format_duration(length));

    let progress_ratio = if length > 0 {
        (elapsed as f64 / length as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let controls_info = format!(
        " requested {:?} | current {:?} | H for help ",
        link.requested_playback(),
        link.current_playback_state()
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(status_text)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
