//! Requested vs. observed playback state

use crate::protocol::PlaybackStatus;

use super::types::{PlaybackRequest, PlaybackState};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackIntent {
    pub requested: PlaybackRequest,
    pub current: PlaybackState,
}

impl PlaybackIntent {
    /// The request still to be applied, if the accessory disagrees with it.
    pub fn pending_correction(&self) -> Option<PlaybackRequest> {
        if self.requested.is_satisfied_by(self.current) {
            None
        } else {
            Some(self.requested)
        }
    }

    /// Assume a correction took effect.
    pub fn settle(&mut self) {
        self.current = self.requested.as_state();
    }

    pub fn observe(&mut self, status: PlaybackStatus) {
        self.current = match status {
            PlaybackStatus::Stopped => PlaybackState::Stopped,
            PlaybackStatus::Playing => PlaybackState::Playing,
            PlaybackStatus::Paused => PlaybackState::Paused,
            PlaybackStatus::Other(code) => {
                tracing::debug!(code, "Unrecognized playback status");
                PlaybackState::Unknown
            }
        };
    }

    pub fn force_unknown(&mut self) {
        self.current = PlaybackState::Unknown;
    }
}
