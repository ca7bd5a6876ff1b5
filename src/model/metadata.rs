//! Track metadata and the title → artist → album retrieval chain

use crate::protocol::AdvancedRequest;

use super::types::SequenceState;

/// Metadata of the track at the cached playlist position.
///
/// The three text fields are cleared together whenever the position changes
/// or a chain is restarted, so a reader never sees a title from one track
/// next to an artist from another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub position: Option<u32>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TrackMetadata {
    fn clear_text(&mut self) {
        self.title = None;
        self.artist = None;
        self.album = None;
    }
}

/// Replace a text slot with a freshly allocated copy of `text`.
///
/// On allocation failure the previous value is kept.
fn replace_text(slot: &mut Option<String>, text: &str, field: &'static str) {
    let mut buffer = String::new();
    if let Err(e) = buffer.try_reserve_exact(text.len()) {
        tracing::warn!(field, len = text.len(), error = %e, "Could not allocate metadata text, keeping previous value");
        return;
    }
    buffer.push_str(text);
    *slot = Some(buffer);
}

/// Drives one retrieval chain per track change.
#[derive(Clone, Debug)]
pub struct MetadataSequencer {
    metadata: TrackMetadata,
    state: SequenceState,
    expiry: Option<u64>,
    timeout_ms: u64,
    track_changes: u64,
    completions: u64,
}

impl MetadataSequencer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            metadata: TrackMetadata::default(),
            state: SequenceState::Idle,
            expiry: None,
            timeout_ms,
            track_changes: 0,
            completions: 0,
        }
    }

    pub fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn position(&self) -> Option<u32> {
        self.metadata.position
    }

    pub fn expiry(&self) -> Option<u64> {
        self.expiry
    }

    /// Number of accepted position changes since construction.
    pub fn track_changes(&self) -> u64 {
        self.track_changes
    }

    /// Number of chains that reached `Complete` since construction.
    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Accept a playlist position update.
    ///
    /// Returns the title request when the position differs from the cached
    /// one and a new chain starts.
    pub fn accept_position(&mut self, position: u32, now: u64) -> Option<AdvancedRequest> {
        if self.metadata.position == Some(position) {
            return None;
        }
        tracing::debug!(from = ?self.metadata.position, to = position, "Track position changed");
        self.metadata.position = Some(position);
        self.track_changes += 1;
        Some(self.begin(position, now))
    }

    fn begin(&mut self, position: u32, now: u64) -> AdvancedRequest {
        self.metadata.clear_text();
        self.state = SequenceState::AwaitingTitle;
        self.expiry = Some(now.saturating_add(self.timeout_ms));
        AdvancedRequest::Title(position)
    }

    pub fn accept_title(&mut self, title: &str) -> Option<AdvancedRequest> {
        let position = self.expect(SequenceState::AwaitingTitle, "title")?;
        replace_text(&mut self.metadata.title, title, "title");
        self.state = SequenceState::AwaitingArtist;
        Some(AdvancedRequest::Artist(position))
    }

    pub fn accept_artist(&mut self, artist: &str) -> Option<AdvancedRequest> {
        let position = self.expect(SequenceState::AwaitingArtist, "artist")?;
        replace_text(&mut self.metadata.artist, artist, "artist");
        self.state = SequenceState::AwaitingAlbum;
        Some(AdvancedRequest::Album(position))
    }

    /// Returns `true` when the album completes the chain.
    pub fn accept_album(&mut self, album: &str) -> bool {
        if self.expect(SequenceState::AwaitingAlbum, "album").is_none() {
            return false;
        }
        replace_text(&mut self.metadata.album, album, "album");
        self.state = SequenceState::Complete;
        self.expiry = None;
        self.completions += 1;
        true
    }

    fn expect(&self, wanted: SequenceState, field: &'static str) -> Option<u32> {
        if self.state != wanted {
            tracing::debug!(field, state = ?self.state, "Ignoring out-of-sequence metadata response");
            return None;
        }
        self.metadata.position
    }

    /// Restart a stalled chain from the title.
    pub fn check_timeout(&mut self, now: u64) -> Option<AdvancedRequest> {
        if !self.state.in_progress() {
            return None;
        }
        let expiry = self.expiry?;
        if now <= expiry {
            return None;
        }
        let position = self.metadata.position?;
        tracing::warn!(position, state = ?self.state, "Metadata chain stalled, restarting");
        Some(self.begin(position, now))
    }

    /// Forget the cached track entirely. Counters are kept so observers can
    /// still detect edges across a disconnection.
    pub fn reset(&mut self) {
        self.metadata = TrackMetadata::default();
        self.state = SequenceState::Idle;
        self.expiry = None;
    }
}
