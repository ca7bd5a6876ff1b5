//! Core type definitions for the accessory link

/// Presence and active dialect of the accessory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Unknown,
    Simple,
    /// Advanced dialect requested, not yet confirmed by a status response.
    SwitchingToAdvanced,
    Advanced,
}

impl Mode {
    pub fn is_present(self) -> bool {
        self != Mode::Unknown
    }

    /// Whether the advanced-mode deadline governs this mode.
    pub fn is_advanced_family(self) -> bool {
        matches!(self, Mode::SwitchingToAdvanced | Mode::Advanced)
    }

    /// The mode as observers see it: the switching state is reported as
    /// `Simple` until the accessory confirms the advanced dialect.
    pub fn observed(self) -> Self {
        match self {
            Mode::SwitchingToAdvanced => Mode::Simple,
            other => other,
        }
    }
}

/// Which dialect the caller wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DesiredDialect {
    #[default]
    Simple,
    Advanced,
}

/// Which codec currently owns the inbound stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Disarmed,
    Simple,
    Advanced,
}

/// Last observed (or assumed) playback state of the accessory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Unknown,
    Playing,
    Paused,
    Stopped,
}

/// Playback state the caller asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackRequest {
    Playing,
    #[default]
    Paused,
}

impl PlaybackRequest {
    /// Whether the observed state already honours this request. Anything
    /// but an exact match, Stopped included, calls for a correction.
    pub fn is_satisfied_by(self, state: PlaybackState) -> bool {
        self.as_state() == state
    }

    pub fn as_state(self) -> PlaybackState {
        match self {
            PlaybackRequest::Playing => PlaybackState::Playing,
            PlaybackRequest::Paused => PlaybackState::Paused,
        }
    }
}

/// Progress of the title → artist → album retrieval chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SequenceState {
    #[default]
    Idle,
    AwaitingTitle,
    AwaitingArtist,
    AwaitingAlbum,
    Complete,
}

impl SequenceState {
    pub fn in_progress(self) -> bool {
        matches!(
            self,
            SequenceState::AwaitingTitle | SequenceState::AwaitingArtist | SequenceState::AwaitingAlbum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_is_observed_as_simple() {
        assert_eq!(Mode::SwitchingToAdvanced.observed(), Mode::Simple);
        assert_eq!(Mode::Advanced.observed(), Mode::Advanced);
        assert_eq!(Mode::Unknown.observed(), Mode::Unknown);
    }

    #[test]
    fn only_an_exact_match_satisfies_a_request() {
        assert!(!PlaybackRequest::Paused.is_satisfied_by(PlaybackState::Stopped));
        assert!(PlaybackRequest::Paused.is_satisfied_by(PlaybackState::Paused));
        assert!(!PlaybackRequest::Paused.is_satisfied_by(PlaybackState::Unknown));
        assert!(!PlaybackRequest::Playing.is_satisfied_by(PlaybackState::Stopped));
        assert!(PlaybackRequest::Playing.is_satisfied_by(PlaybackState::Playing));
    }
}
