//! View module - UI rendering
//!
//! Renders the bench with ratatui. Submodules by component:
//!
//! - `utils`: Shared formatting helpers
//! - `status`: Link status bar
//! - `track`: Current track panel
//! - `event_log`: Scrolling event log
//! - `progress`: Progress bar
//! - `overlays`: Help popup

mod utils;
mod status;
mod track;
mod event_log;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::bench::Bench;

pub struct BenchView;

impl BenchView {
    pub fn render(frame: &mut Frame, bench: &Bench) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Link status
                Constraint::Min(0),    // Track + event log
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        status::render_status_bar(frame, chunks[0], bench);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        track::render_track_panel(frame, main_chunks[0], &bench.link);
        event_log::render_event_log(frame, main_chunks[1], bench);

        progress::render_progress_bar(frame, chunks[2], &bench.link);

        if bench.show_help {
            overlays::render_help_popup(frame);
        }
    }
}
