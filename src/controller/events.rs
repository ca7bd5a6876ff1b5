//! Edge-triggered notifications to the embedding application

use tokio::sync::mpsc::UnboundedSender;

use crate::model::{Mode, PlaybackState, SequenceState, Session, TrackMetadata};

/// Observer of link state changes. Every method defaults to a no-op.
pub trait AccessoryListener {
    /// Never called with [`Mode::SwitchingToAdvanced`].
    fn on_mode_changed(&mut self, _mode: Mode) {}
    fn on_track_changed(&mut self, _position: u32) {}
    fn on_metadata_ready(&mut self, _metadata: &TrackMetadata) {}
    fn on_playback_state_changed(&mut self, _state: PlaybackState) {}
}

impl AccessoryListener for () {}

/// Owned form of a notification, for channel-based consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessoryEvent {
    ModeChanged(Mode),
    TrackChanged(u32),
    MetadataReady(TrackMetadata),
    PlaybackStateChanged(PlaybackState),
}

impl AccessoryListener for UnboundedSender<AccessoryEvent> {
    fn on_mode_changed(&mut self, mode: Mode) {
        let _ = self.send(AccessoryEvent::ModeChanged(mode));
    }

    fn on_track_changed(&mut self, position: u32) {
        let _ = self.send(AccessoryEvent::TrackChanged(position));
    }

    fn on_metadata_ready(&mut self, metadata: &TrackMetadata) {
        let _ = self.send(AccessoryEvent::MetadataReady(metadata.clone()));
    }

    fn on_playback_state_changed(&mut self, state: PlaybackState) {
        let _ = self.send(AccessoryEvent::PlaybackStateChanged(state));
    }
}

/// What observers can see of the session at a step boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    mode: Mode,
    track_changes: u64,
    completions: u64,
    playback: PlaybackState,
}

impl Snapshot {
    pub(crate) fn of(session: &Session) -> Self {
        Self {
            mode: session.mode.observed(),
            track_changes: session.track.track_changes(),
            completions: session.track.completions(),
            playback: session.playback.current,
        }
    }
}

/// Fire at most one notification per kind for the changes between `before`
/// and the current session.
pub(crate) fn dispatch(before: Snapshot, session: &Session, listener: &mut dyn AccessoryListener) {
    let after = Snapshot::of(session);

    if before.mode != after.mode {
        tracing::info!(from = ?before.mode, to = ?after.mode, "Accessory mode changed");
        listener.on_mode_changed(after.mode);
    }

    if before.track_changes != after.track_changes {
        if let Some(position) = session.track.position() {
            listener.on_track_changed(position);
        }
    }

    if before.completions != after.completions && session.track.state() == SequenceState::Complete {
        listener.on_metadata_ready(session.track.metadata());
    }

    if before.playback != after.playback {
        tracing::debug!(from = ?before.playback, to = ?after.playback, "Playback state changed");
        listener.on_playback_state_changed(after.playback);
    }
}
