//! The resettable state bundle owned by the link

use std::collections::VecDeque;

use crate::config::LinkConfig;
use crate::protocol::AdvancedRequest;

use super::liveness::Liveness;
use super::metadata::MetadataSequencer;
use super::playback::PlaybackIntent;
use super::types::{Dialect, Mode};

/// Work produced by state changes that needs the transport to carry out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outbound {
    Request(AdvancedRequest),
    Arm(Dialect),
    DiscardInput,
}

/// Everything a disconnection wipes.
#[derive(Debug)]
pub struct Session {
    pub mode: Mode,
    pub playback: PlaybackIntent,
    pub track: MetadataSequencer,
    pub liveness: Liveness,
    pub track_length_ms: u32,
    pub elapsed_ms: u32,
    /// Timestamp of the tick currently being processed.
    pub now: u64,
    outbox: VecDeque<Outbound>,
}

impl Session {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            mode: Mode::Unknown,
            playback: PlaybackIntent::default(),
            track: MetadataSequencer::new(config.metadata_timeout_ms),
            liveness: Liveness::new(config.advanced_window_ms, config.grace_misses),
            track_length_ms: 0,
            elapsed_ms: 0,
            now: 0,
            outbox: VecDeque::new(),
        }
    }

    /// Return to the state of a freshly constructed link.
    pub fn reset(&mut self) {
        self.mode = Mode::Unknown;
        self.playback = PlaybackIntent::default();
        self.track.reset();
        self.liveness.disarm();
        self.track_length_ms = 0;
        self.elapsed_ms = 0;
        self.outbox.clear();
    }

    pub fn request(&mut self, request: AdvancedRequest) {
        self.outbox.push_back(Outbound::Request(request));
    }

    pub fn push(&mut self, outbound: Outbound) {
        self.outbox.push_back(outbound);
    }

    pub fn next_outbound(&mut self) -> Option<Outbound> {
        self.outbox.pop_front()
    }

    /// Evidence of a live link: push the advanced-mode deadline out.
    pub fn renew(&mut self) {
        if self.mode.is_advanced_family() {
            self.liveness.renew(self.now);
        }
    }
}
