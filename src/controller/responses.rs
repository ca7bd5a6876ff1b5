//! Response handlers for the advanced dialect
//!
//! Invoked synchronously from the inbound drain. Handlers only touch the
//! session: follow-up requests go to the outbox and are sent by the
//! orchestrator once the handler returns.

use crate::model::Session;
use crate::protocol::{AdvancedListener, AdvancedRequest, Feedback, PlaybackStatus, PollingCommand};

use super::mode::{transition, ModeEvent};

impl Session {
    fn accept_position(&mut self, position: u32) {
        if let Some(request) = self.track.accept_position(position, self.now) {
            self.elapsed_ms = 0;
            self.request(request);
        }
    }
}

impl AdvancedListener for Session {
    fn on_feedback(&mut self, feedback: Feedback, command: u8) {
        tracing::debug!(?feedback, command = format_args!("{:#04x}", command), "Feedback received");

        match feedback {
            Feedback::Success => self.renew(),
            Feedback::InvalidParameter => {
                // Seen right before unrequested drops to the simple dialect;
                // not acted upon.
                tracing::warn!(command = format_args!("{:#04x}", command), "Accessory rejected a parameter");
            }
            _ => {}
        }
    }

    fn on_time_and_status(&mut self, track_length_ms: u32, elapsed_ms: u32, status: PlaybackStatus) {
        if let Some(t) = transition(self.mode, ModeEvent::StatusReceived) {
            tracing::info!("Advanced dialect confirmed");
            self.enter(t);
        }

        self.renew();
        self.track_length_ms = track_length_ms;
        self.elapsed_ms = elapsed_ms;
        self.playback.observe(status);
        tracing::debug!(?status, track_length_ms, elapsed_ms, "Time and status updated");

        if status != PlaybackStatus::Stopped {
            self.request(AdvancedRequest::PlaylistPosition);
        }
    }

    fn on_playlist_position(&mut self, position: u32) {
        self.renew();
        self.accept_position(position);
    }

    fn on_title(&mut self, title: &str) {
        self.renew();
        tracing::debug!(title, "Got track title");
        if let Some(request) = self.track.accept_title(title) {
            self.request(request);
        }
    }

    fn on_artist(&mut self, artist: &str) {
        self.renew();
        tracing::debug!(artist, "Got artist");
        if let Some(request) = self.track.accept_artist(artist) {
            self.request(request);
        }
    }

    fn on_album(&mut self, album: &str) {
        self.renew();
        tracing::debug!(album, "Got album");
        if self.track.accept_album(album) {
            tracing::info!(position = ?self.track.position(), "Track metadata complete");
        }
    }

    fn on_polling(&mut self, command: PollingCommand, value: u32) {
        self.renew();

        match command {
            PollingCommand::TrackChange => {
                tracing::debug!(position = value, "Polled track change");
                self.accept_position(value);
            }
            PollingCommand::ElapsedTime => {
                tracing::trace!(elapsed_ms = value, "Polled elapsed time");
                self.elapsed_ms = value;
            }
            PollingCommand::Other(code) => {
                tracing::debug!(code, value, "Unknown polling command");
            }
        }
    }
}
