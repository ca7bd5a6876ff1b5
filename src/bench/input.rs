//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use podlink::PlaybackRequest;

use super::Bench;

impl Bench {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Help popup swallows everything but its own close keys
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                self.show_help = false;
            }
            return;
        }

        match key.code {
            KeyCode::Char(' ') => match self.link.requested_playback() {
                PlaybackRequest::Playing => {
                    self.link.request_pause();
                    self.note("requested pause");
                }
                PlaybackRequest::Paused => {
                    self.link.request_play();
                    self.note("requested play");
                }
            },
            KeyCode::Char('n') => {
                self.link.next_track();
                self.note("next track");
            }
            KeyCode::Char('p') => {
                self.link.prev_track();
                self.note("previous track");
            }
            KeyCode::Char('N') => {
                self.link.next_album();
                self.note("next album");
            }
            KeyCode::Char('P') => {
                self.link.prev_album();
                self.note("previous album");
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.link.request_advanced_dialect();
                self.note("requested advanced dialect");
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.link.request_simple_dialect();
                self.note("requested simple dialect");
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                if self.pod.is_attached() {
                    self.pod.detach();
                    self.note("accessory unplugged");
                } else {
                    self.pod.attach();
                    self.note("accessory plugged in");
                }
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let responsive = !self.pod.is_responsive();
                self.pod.set_responsive(responsive);
                self.note(if responsive { "accessory answering" } else { "accessory muted" });
            }
            KeyCode::Char('h') | KeyCode::Char('H') => self.show_help = true,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                tracing::info!(mode = ?self.link.mode(), "Quit requested");
                self.should_quit = true;
            }
            _ => {}
        }
    }
}
