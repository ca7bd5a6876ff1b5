//! Playback reconciliation and transport controls

use crate::model::{Mode, PlaybackRequest};
use crate::protocol::{AdvancedRequest, PlaybackControl, SimpleCommand};

use super::Accessory;

impl Accessory {
    pub fn request_play(&mut self) {
        tracing::debug!("Play requested");
        self.session.playback.requested = PlaybackRequest::Playing;
    }

    pub fn request_pause(&mut self) {
        tracing::debug!("Pause requested");
        self.session.playback.requested = PlaybackRequest::Paused;
    }

    pub fn next_track(&mut self) {
        self.transport(PlaybackControl::SkipForward, SimpleCommand::SkipForward);
    }

    pub fn prev_track(&mut self) {
        self.transport(PlaybackControl::SkipBackward, SimpleCommand::SkipBackward);
    }

    /// Album skips exist only in the simple dialect.
    pub fn next_album(&mut self) {
        self.album_skip(SimpleCommand::NextAlbum);
    }

    pub fn prev_album(&mut self) {
        self.album_skip(SimpleCommand::PreviousAlbum);
    }

    fn transport(&mut self, control: PlaybackControl, command: SimpleCommand) {
        match self.session.mode {
            Mode::Unknown => {
                tracing::debug!(?command, "No accessory present, ignoring transport control");
            }
            Mode::Advanced => {
                tracing::debug!(?control, "Transport control");
                self.send_advanced(AdvancedRequest::Control(control));
            }
            Mode::Simple | Mode::SwitchingToAdvanced => {
                tracing::debug!(?command, "Transport button");
                self.press(command);
            }
        }
    }

    fn album_skip(&mut self, command: SimpleCommand) {
        match self.session.mode {
            Mode::Simple | Mode::SwitchingToAdvanced => self.press(command),
            Mode::Advanced => {
                tracing::debug!(?command, "Album skip has no advanced-dialect equivalent, ignoring");
            }
            Mode::Unknown => {
                tracing::debug!(?command, "No accessory present, ignoring album skip");
            }
        }
    }

    /// Press a button, hold it for the configured delay, release it.
    fn press(&mut self, command: SimpleCommand) {
        self.send_simple(command);
        self.io.delay.delay_ms(self.config.button_delay_ms);
        self.send_simple(SimpleCommand::ButtonReleased);
    }

    fn send_simple(&mut self, command: SimpleCommand) {
        if let Err(e) = self.io.simple.send(self.io.stream.as_mut(), command) {
            tracing::warn!(?command, error = %e, "Simple command failed");
        }
    }

    /// Bring the accessory in line with the requested playback state.
    ///
    /// The correction is assumed to work; a later status response or the
    /// liveness deadline will tell otherwise.
    pub(super) fn reconcile_playback(&mut self) {
        if !self.session.mode.is_present() {
            self.session.playback.force_unknown();
            return;
        }

        let Some(target) = self.session.playback.pending_correction() else {
            return;
        };

        tracing::debug!(
            requested = ?target,
            current = ?self.session.playback.current,
            mode = ?self.session.mode,
            "Playing state mismatch, correcting"
        );

        if self.session.mode == Mode::Advanced {
            self.send_advanced(AdvancedRequest::Control(PlaybackControl::PlayPause));
        } else {
            let button = match target {
                PlaybackRequest::Playing => SimpleCommand::JustPlay,
                PlaybackRequest::Paused => SimpleCommand::JustPause,
            };
            self.press(SimpleCommand::PowerOn);
            self.io.delay.delay_ms(self.config.button_delay_ms);
            self.press(button);
        }

        self.session.playback.settle();
        self.session.renew();
    }
}
