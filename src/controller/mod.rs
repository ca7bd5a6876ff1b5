//! Controller module - Link orchestration
//!
//! This module contains [`Accessory`], the single entry point the embedding
//! application drives. It is organized into submodules by responsibility:
//!
//! - `mode`: Mode transition table
//! - `responses`: Advanced-dialect response handlers
//! - `playback`: Playback reconciliation and transport controls
//! - `events`: Listener trait and edge-triggered dispatch

mod mode;
mod responses;
mod playback;
mod events;

pub use events::{AccessoryEvent, AccessoryListener};
pub use mode::{resolve, transition, Effect, ModeEvent, Transition};

use crate::config::LinkConfig;
use crate::hal::Peripherals;
use crate::model::{
    DesiredDialect, Dialect, Expiry, Mode, Outbound, PlaybackRequest, PlaybackState,
    SequenceState, Session, TrackMetadata,
};
use crate::protocol::AdvancedRequest;

use events::Snapshot;

/// Logical session with a serial-attached accessory.
///
/// Construct it once with its collaborators, then call [`Accessory::tick`]
/// from the application loop. Nothing happens between ticks except the
/// transport commands issued directly by the control methods.
pub struct Accessory {
    io: Peripherals,
    config: LinkConfig,
    listener: Box<dyn AccessoryListener>,
    session: Session,
    dialect: Dialect,
    desired: DesiredDialect,
    last_tick: Option<u64>,
}

impl Accessory {
    pub fn new(io: Peripherals, config: LinkConfig, listener: impl AccessoryListener + 'static) -> Self {
        let session = Session::new(&config);
        tracing::debug!(?config, "Accessory link initialized");
        Self {
            io,
            config,
            listener: Box::new(listener),
            session,
            dialect: Dialect::Disarmed,
            desired: DesiredDialect::Simple,
            last_tick: None,
        }
    }

    /// Periodic entry point; calls closer together than the configured tick
    /// interval are no-ops.
    pub fn tick(&mut self) {
        let now = self.io.clock.now_ms();
        if let Some(last) = self.last_tick {
            if now.saturating_sub(last) < self.config.tick_interval_ms {
                return;
            }
        }
        self.last_tick = Some(now);
        self.session.now = now;

        let before = Snapshot::of(&self.session);

        self.drain_inbound();
        self.evaluate_mode();
        self.follow_desired_dialect();
        self.reconcile_playback();

        if self.session.mode == Mode::Advanced {
            self.evaluate_metadata_timeout();
            self.evaluate_keepalive();
        }

        events::dispatch(before, &self.session, self.listener.as_mut());
    }

    fn drain_inbound(&mut self) {
        if self.dialect != Dialect::Advanced {
            if self.io.stream.bytes_available() > 0 {
                self.io.stream.discard_input();
            }
            return;
        }

        let mut units = 0;
        while self.io.stream.bytes_available() > 0 {
            if units == self.config.max_inbound_per_tick {
                tracing::warn!(units, "Inbound drain budget exhausted, resuming next tick");
                break;
            }
            units += 1;

            if let Err(e) = self.io.advanced.poll(self.io.stream.as_mut(), &mut self.session) {
                tracing::warn!(error = %e, "Advanced codec failed to decode inbound data");
            }
            self.flush_outbox();
        }
        tracing::trace!(units, "Inbound drained");
    }

    fn evaluate_mode(&mut self) {
        let mut events = Vec::with_capacity(2);

        if self.io.presence.is_asserted() {
            events.push(ModeEvent::PresenceAsserted);
        } else {
            events.push(ModeEvent::PresenceLost);
        }

        if self.session.mode.is_advanced_family() {
            match self.session.liveness.check(self.session.now) {
                Expiry::Alive => {}
                Expiry::Grace { misses } => {
                    tracing::warn!(misses, mode = ?self.session.mode, "Advanced-mode deadline missed");
                }
                Expiry::Lost => {
                    tracing::warn!(mode = ?self.session.mode, "Accessory stopped answering");
                    events.push(ModeEvent::LinkLost);
                }
            }
        }

        if let Some(t) = resolve(self.session.mode, &events) {
            if t.to == Mode::Unknown {
                tracing::info!(from = ?t.from, "Accessory detached");
            } else if t.from == Mode::Unknown {
                tracing::info!("Accessory attached");
            }
            self.session.enter(t);
            self.flush_outbox();
        }
    }

    fn follow_desired_dialect(&mut self) {
        let event = match (self.desired, self.session.mode) {
            (DesiredDialect::Advanced, Mode::Simple) => ModeEvent::AdvancedRequested,
            (DesiredDialect::Simple, Mode::SwitchingToAdvanced | Mode::Advanced) => {
                ModeEvent::SimpleRequested
            }
            _ => return,
        };

        if let Some(t) = transition(self.session.mode, event) {
            tracing::info!(?event, "Switching dialect");
            self.session.enter(t);
            self.flush_outbox();
        }
    }

    fn evaluate_metadata_timeout(&mut self) {
        if let Some(request) = self.session.track.check_timeout(self.session.now) {
            self.session.request(request);
            self.flush_outbox();
        }
    }

    fn evaluate_keepalive(&mut self) {
        if self.session.playback.current == PlaybackState::Playing {
            return;
        }
        if self
            .session
            .liveness
            .keepalive_due(self.session.now, self.config.keepalive_margin_ms)
        {
            tracing::debug!(
                remaining_ms = ?self.session.liveness.remaining(self.session.now),
                "Requesting time and status for keep-alive"
            );
            self.session.request(AdvancedRequest::TimeAndStatus);
            self.flush_outbox();
        }
    }

    /// Carry out queued requests and dialect changes, in order.
    fn flush_outbox(&mut self) {
        while let Some(outbound) = self.session.next_outbound() {
            match outbound {
                Outbound::Request(request) => self.send_advanced(request),
                Outbound::Arm(dialect) => self.arm(dialect),
                Outbound::DiscardInput => self.io.stream.discard_input(),
            }
        }
    }

    fn send_advanced(&mut self, request: AdvancedRequest) {
        if self.dialect != Dialect::Advanced {
            tracing::debug!(?request, dialect = ?self.dialect, "Dropping advanced request, codec not armed");
            return;
        }
        tracing::trace!(?request, "Sending advanced request");
        if let Err(e) = self.io.advanced.send(self.io.stream.as_mut(), request) {
            tracing::warn!(?request, error = %e, "Advanced request failed");
        }
    }

    /// Switch which codec owns the stream. Only the advanced codec has
    /// anything to arm; the simple one is stateless.
    fn arm(&mut self, dialect: Dialect) {
        if self.dialect == dialect {
            return;
        }

        if self.dialect == Dialect::Advanced {
            if let Err(e) = self.io.advanced.disable(self.io.stream.as_mut()) {
                tracing::warn!(error = %e, "Failed to disarm advanced codec");
            }
        }
        if dialect == Dialect::Advanced {
            if let Err(e) = self.io.advanced.enable(self.io.stream.as_mut()) {
                tracing::warn!(error = %e, "Failed to arm advanced codec");
            }
        }

        tracing::debug!(from = ?self.dialect, to = ?dialect, "Codec armed");
        self.dialect = dialect;
    }

    // ========================================================================
    // Dialect requests
    // ========================================================================

    /// Ask for the advanced dialect; applied on the next tick.
    pub fn request_advanced_dialect(&mut self) {
        self.desired = DesiredDialect::Advanced;
    }

    pub fn request_simple_dialect(&mut self) {
        self.desired = DesiredDialect::Simple;
    }

    pub fn desired_dialect(&self) -> DesiredDialect {
        self.desired
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_present(&self) -> bool {
        self.session.mode.is_present()
    }

    pub fn is_advanced_active(&self) -> bool {
        self.session.mode == Mode::Advanced
    }

    /// The exact internal mode, including the transient switching state.
    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn current_title(&self) -> Option<&str> {
        self.session.track.metadata().title.as_deref()
    }

    pub fn current_artist(&self) -> Option<&str> {
        self.session.track.metadata().artist.as_deref()
    }

    pub fn current_album(&self) -> Option<&str> {
        self.session.track.metadata().album.as_deref()
    }

    /// Playlist position of the current track, once the accessory has
    /// reported one.
    pub fn current_track_position(&self) -> Option<u32> {
        self.session.track.position()
    }

    pub fn metadata(&self) -> &TrackMetadata {
        self.session.track.metadata()
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.session.track.state()
    }

    pub fn current_playback_state(&self) -> PlaybackState {
        self.session.playback.current
    }

    pub fn requested_playback(&self) -> PlaybackRequest {
        self.session.playback.requested
    }

    pub fn track_length_ms(&self) -> u32 {
        self.session.track_length_ms
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.session.elapsed_ms
    }

    /// Milliseconds left on the advanced-mode deadline, if one is armed.
    pub fn liveness_remaining_ms(&self) -> Option<u64> {
        self.session.liveness.remaining(self.io.clock.now_ms())
    }

    pub fn missed_deadlines(&self) -> u8 {
        self.session.liveness.misses()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}
