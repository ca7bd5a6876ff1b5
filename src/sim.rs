//! In-process accessory simulator
//!
//! [`SimulatedPod`] plays the accessory side of the link for the bench and
//! the tests. It works at the level of logical messages: each queued
//! response counts as one available inbound unit, and the codecs hand
//! requests straight to the simulated device instead of encoding bytes.
//!
//! Time only moves when [`SimulatedPod::advance`] is called or when the link
//! performs a button delay, so runs are fully deterministic.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::error::CodecError;
use crate::hal::{ByteStream, Clock, Delay, Peripherals, PresencePin};
use crate::protocol::{
    AdvancedCodec, AdvancedListener, AdvancedRequest, Feedback, PlaybackControl, PlaybackStatus,
    PollingCommand, PollingMode, SimpleCodec, SimpleCommand,
};

const POLL_PERIOD_MS: u64 = 500;
const RESTART_THRESHOLD_MS: u32 = 3_000;

const CMD_TITLE: u8 = 0x20;
const CMD_ARTIST: u8 = 0x22;
const CMD_ALBUM: u8 = 0x24;
const CMD_POLLING: u8 = 0x26;
const CMD_PLAYBACK_CONTROL: u8 = 0x29;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub length_ms: u32,
}

impl SimTrack {
    pub fn new(title: &str, artist: &str, album: &str, length_ms: u32) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            length_ms,
        }
    }
}

/// A message travelling from the accessory to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PodMessage {
    Feedback(Feedback, u8),
    TimeAndStatus {
        track_length_ms: u32,
        elapsed_ms: u32,
        status: PlaybackStatus,
    },
    PlaylistPosition(u32),
    Title(String),
    Artist(String),
    Album(String),
    Polling(PollingCommand, u32),
}

#[derive(Debug)]
struct PodState {
    now: u64,
    attached: bool,
    responsive: bool,
    advanced: bool,
    polling: bool,
    since_poll_ms: u64,
    status: PlaybackStatus,
    position: u32,
    elapsed_ms: u32,
    tracks: Vec<SimTrack>,
    inbound: VecDeque<PodMessage>,
    simple_log: Vec<SimpleCommand>,
    advanced_log: Vec<AdvancedRequest>,
}

impl PodState {
    fn answering(&self) -> bool {
        self.attached && self.responsive && self.advanced
    }

    fn reply(&mut self, message: PodMessage) {
        if self.answering() {
            self.inbound.push_back(message);
        }
    }

    fn track(&self, position: u32) -> Option<&SimTrack> {
        self.tracks.get(position as usize)
    }

    fn change_track(&mut self, position: u32) {
        if self.tracks.is_empty() {
            return;
        }
        self.position = position % self.tracks.len() as u32;
        self.elapsed_ms = 0;
        if self.polling {
            let position = self.position;
            self.reply(PodMessage::Polling(PollingCommand::TrackChange, position));
        }
    }

    fn skip_forward(&mut self) {
        self.change_track(self.position + 1);
    }

    fn skip_backward(&mut self) {
        if self.elapsed_ms > RESTART_THRESHOLD_MS || self.position == 0 {
            self.elapsed_ms = 0;
        } else {
            self.change_track(self.position - 1);
        }
    }

    fn album_of(&self, position: u32) -> Option<&str> {
        self.track(position).map(|track| track.album.as_str())
    }

    fn next_album(&mut self) {
        let current = self.album_of(self.position).map(str::to_string);
        let next = (self.position + 1..self.tracks.len() as u32)
            .find(|&i| self.album_of(i).map(str::to_string) != current)
            .unwrap_or(0);
        self.change_track(next);
    }

    fn previous_album(&mut self) {
        let album_start = |state: &PodState, from: u32| {
            let album = state.album_of(from).map(str::to_string);
            let mut start = from;
            while start > 0 && state.album_of(start - 1).map(str::to_string) == album {
                start -= 1;
            }
            start
        };

        let start = album_start(self, self.position);
        let target = if start == self.position && start > 0 {
            album_start(self, start - 1)
        } else {
            start
        };
        self.change_track(target);
    }

    fn toggle_play(&mut self) {
        self.status = match self.status {
            PlaybackStatus::Playing => PlaybackStatus::Paused,
            _ => PlaybackStatus::Playing,
        };
    }

    fn press(&mut self, command: SimpleCommand) {
        self.simple_log.push(command);
        if !self.attached {
            return;
        }
        match command {
            SimpleCommand::SkipForward => self.skip_forward(),
            SimpleCommand::SkipBackward => self.skip_backward(),
            SimpleCommand::NextAlbum => self.next_album(),
            SimpleCommand::PreviousAlbum => self.previous_album(),
            SimpleCommand::JustPlay => self.status = PlaybackStatus::Playing,
            SimpleCommand::JustPause => self.status = PlaybackStatus::Paused,
            SimpleCommand::PowerOn | SimpleCommand::ButtonReleased => {}
        }
    }

    fn handle(&mut self, request: AdvancedRequest) {
        self.advanced_log.push(request);
        if !self.attached || !self.responsive {
            return;
        }

        match request {
            AdvancedRequest::TimeAndStatus => {
                let track_length_ms = self.track(self.position).map_or(0, |t| t.length_ms);
                let message = PodMessage::TimeAndStatus {
                    track_length_ms,
                    elapsed_ms: self.elapsed_ms,
                    status: self.status,
                };
                self.reply(message);
            }
            AdvancedRequest::PlaylistPosition => {
                let position = self.position;
                self.reply(PodMessage::PlaylistPosition(position));
            }
            AdvancedRequest::Title(i) => {
                let message = match self.track(i) {
                    Some(track) => PodMessage::Title(track.title.clone()),
                    None => PodMessage::Feedback(Feedback::InvalidParameter, CMD_TITLE),
                };
                self.reply(message);
            }
            AdvancedRequest::Artist(i) => {
                let message = match self.track(i) {
                    Some(track) => PodMessage::Artist(track.artist.clone()),
                    None => PodMessage::Feedback(Feedback::InvalidParameter, CMD_ARTIST),
                };
                self.reply(message);
            }
            AdvancedRequest::Album(i) => {
                let message = match self.track(i) {
                    Some(track) => PodMessage::Album(track.album.clone()),
                    None => PodMessage::Feedback(Feedback::InvalidParameter, CMD_ALBUM),
                };
                self.reply(message);
            }
            AdvancedRequest::SetPolling(mode) => {
                self.polling = mode == PollingMode::Start;
                self.since_poll_ms = 0;
                self.reply(PodMessage::Feedback(Feedback::Success, CMD_POLLING));
            }
            AdvancedRequest::Control(control) => {
                match control {
                    PlaybackControl::PlayPause => self.toggle_play(),
                    PlaybackControl::Stop => {
                        self.status = PlaybackStatus::Stopped;
                        self.elapsed_ms = 0;
                    }
                    PlaybackControl::SkipForward => self.skip_forward(),
                    PlaybackControl::SkipBackward => self.skip_backward(),
                }
                self.reply(PodMessage::Feedback(Feedback::Success, CMD_PLAYBACK_CONTROL));
            }
        }
    }

    fn advance(&mut self, ms: u64) {
        self.now = self.now.saturating_add(ms);
        if !self.attached || self.status != PlaybackStatus::Playing {
            return;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(ms as u32);
        let length = self.track(self.position).map_or(0, |t| t.length_ms);
        if length > 0 && self.elapsed_ms >= length {
            self.skip_forward();
        }

        if self.polling {
            self.since_poll_ms += ms;
            while self.since_poll_ms >= POLL_PERIOD_MS {
                self.since_poll_ms -= POLL_PERIOD_MS;
                let elapsed = self.elapsed_ms;
                self.reply(PodMessage::Polling(PollingCommand::ElapsedTime, elapsed));
            }
        }
    }
}

/// Handle to a simulated accessory. Clones share the same device.
#[derive(Clone, Debug)]
pub struct SimulatedPod {
    state: Rc<RefCell<PodState>>,
}

impl SimulatedPod {
    /// A detached, responsive, paused accessory holding `tracks`.
    pub fn new(tracks: Vec<SimTrack>) -> Self {
        Self {
            state: Rc::new(RefCell::new(PodState {
                now: 0,
                attached: false,
                responsive: true,
                advanced: false,
                polling: false,
                since_poll_ms: 0,
                status: PlaybackStatus::Paused,
                position: 0,
                elapsed_ms: 0,
                tracks,
                inbound: VecDeque::new(),
                simple_log: Vec::new(),
                advanced_log: Vec::new(),
            })),
        }
    }

    pub fn with_demo_library() -> Self {
        Self::new(vec![
            SimTrack::new("So What", "Miles Davis", "Kind of Blue", 562_000),
            SimTrack::new("Freddie Freeloader", "Miles Davis", "Kind of Blue", 589_000),
            SimTrack::new("Blue in Green", "Miles Davis", "Kind of Blue", 337_000),
            SimTrack::new("Moanin'", "Art Blakey", "Moanin'", 575_000),
            SimTrack::new("Along Came Betty", "Art Blakey", "Moanin'", 370_000),
            SimTrack::new("Take Five", "Dave Brubeck", "Time Out", 324_000),
            SimTrack::new("Blue Rondo a la Turk", "Dave Brubeck", "Time Out", 404_000),
            SimTrack::new("Strange Meadow Lark", "Dave Brubeck", "Time Out", 442_000),
        ])
    }

    /// Collaborators for an [`crate::Accessory`] wired to this device.
    pub fn peripherals(&self) -> Peripherals {
        Peripherals {
            stream: Box::new(SimStream(self.state.clone())),
            presence: Box::new(SimPresence(self.state.clone())),
            clock: Box::new(SimClock(self.state.clone())),
            delay: Box::new(SimDelay(self.state.clone())),
            simple: Box::new(SimSimpleCodec(self.state.clone())),
            advanced: Box::new(SimAdvancedCodec(self.state.clone())),
        }
    }

    pub fn attach(&self) {
        self.state.borrow_mut().attached = true;
    }

    /// Unplug: presence drops, pending input is lost, the device falls back
    /// to its power-on dialect.
    pub fn detach(&self) {
        let mut state = self.state.borrow_mut();
        state.attached = false;
        state.advanced = false;
        state.polling = false;
        state.inbound.clear();
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    /// An unresponsive device stays attached but ignores every request.
    pub fn set_responsive(&self, responsive: bool) {
        self.state.borrow_mut().responsive = responsive;
    }

    pub fn is_responsive(&self) -> bool {
        self.state.borrow().responsive
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now
    }

    /// Let `ms` milliseconds pass on the device.
    pub fn advance(&self, ms: u64) {
        self.state.borrow_mut().advance(ms);
    }

    /// Queue a message as if the device had sent it.
    pub fn inject(&self, message: PodMessage) {
        self.state.borrow_mut().inbound.push_back(message);
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        self.state.borrow_mut().status = status;
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.borrow().status
    }

    pub fn position(&self) -> u32 {
        self.state.borrow().position
    }

    pub fn is_polling(&self) -> bool {
        self.state.borrow().polling
    }

    pub fn in_advanced_dialect(&self) -> bool {
        self.state.borrow().advanced
    }

    pub fn pending_inbound(&self) -> usize {
        self.state.borrow().inbound.len()
    }

    pub fn simple_log(&self) -> Vec<SimpleCommand> {
        self.state.borrow().simple_log.clone()
    }

    pub fn advanced_log(&self) -> Vec<AdvancedRequest> {
        self.state.borrow().advanced_log.clone()
    }

    pub fn clear_logs(&self) {
        let mut state = self.state.borrow_mut();
        state.simple_log.clear();
        state.advanced_log.clear();
    }
}

struct SimStream(Rc<RefCell<PodState>>);

impl ByteStream for SimStream {
    fn bytes_available(&self) -> usize {
        let state = self.0.borrow();
        if state.attached { state.inbound.len() } else { 0 }
    }

    /// Messages are consumed whole by the advanced codec.
    fn read(&mut self) -> Option<u8> {
        None
    }

    fn write(&mut self, _byte: u8) -> io::Result<()> {
        if !self.0.borrow().attached {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "accessory detached"));
        }
        Ok(())
    }

    fn discard_input(&mut self) {
        self.0.borrow_mut().inbound.clear();
    }
}

struct SimPresence(Rc<RefCell<PodState>>);

impl PresencePin for SimPresence {
    fn is_asserted(&mut self) -> bool {
        self.0.borrow().attached
    }
}

struct SimClock(Rc<RefCell<PodState>>);

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.0.borrow().now
    }
}

struct SimDelay(Rc<RefCell<PodState>>);

impl Delay for SimDelay {
    fn delay_ms(&mut self, ms: u64) {
        self.0.borrow_mut().advance(ms);
    }
}

struct SimSimpleCodec(Rc<RefCell<PodState>>);

impl SimpleCodec for SimSimpleCodec {
    fn send(&mut self, _stream: &mut dyn ByteStream, command: SimpleCommand) -> Result<(), CodecError> {
        self.0.borrow_mut().press(command);
        Ok(())
    }
}

struct SimAdvancedCodec(Rc<RefCell<PodState>>);

impl AdvancedCodec for SimAdvancedCodec {
    fn enable(&mut self, _stream: &mut dyn ByteStream) -> Result<(), CodecError> {
        let mut state = self.0.borrow_mut();
        if state.attached && state.responsive {
            state.advanced = true;
        }
        Ok(())
    }

    fn disable(&mut self, _stream: &mut dyn ByteStream) -> Result<(), CodecError> {
        let mut state = self.0.borrow_mut();
        state.advanced = false;
        state.polling = false;
        state.inbound.clear();
        Ok(())
    }

    fn send(&mut self, _stream: &mut dyn ByteStream, request: AdvancedRequest) -> Result<(), CodecError> {
        let mut state = self.0.borrow_mut();
        if state.attached && state.responsive {
            state.advanced = true;
        }
        state.handle(request);
        Ok(())
    }

    fn poll(
        &mut self,
        _stream: &mut dyn ByteStream,
        listener: &mut dyn AdvancedListener,
    ) -> Result<(), CodecError> {
        let message = self.0.borrow_mut().inbound.pop_front();
        let Some(message) = message else {
            return Ok(());
        };

        match message {
            PodMessage::Feedback(feedback, command) => listener.on_feedback(feedback, command),
            PodMessage::TimeAndStatus {
                track_length_ms,
                elapsed_ms,
                status,
            } => listener.on_time_and_status(track_length_ms, elapsed_ms, status),
            PodMessage::PlaylistPosition(position) => listener.on_playlist_position(position),
            PodMessage::Title(title) => listener.on_title(&title),
            PodMessage::Artist(artist) => listener.on_artist(&artist),
            PodMessage::Album(album) => listener.on_album(&album),
            PodMessage::Polling(command, value) => listener.on_polling(command, value),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresponsive_device_logs_but_does_not_answer() {
        let pod = SimulatedPod::with_demo_library();
        pod.attach();
        pod.set_responsive(false);
        let mut io = pod.peripherals();

        io.advanced.enable(io.stream.as_mut()).unwrap();
        io.advanced.send(io.stream.as_mut(), AdvancedRequest::TimeAndStatus).unwrap();

        assert_eq!(pod.advanced_log(), vec![AdvancedRequest::TimeAndStatus]);
        assert_eq!(io.stream.bytes_available(), 0);
    }

    #[test]
    fn album_skips_follow_album_boundaries() {
        let pod = SimulatedPod::with_demo_library();
        pod.attach();
        let mut io = pod.peripherals();

        io.simple.send(io.stream.as_mut(), SimpleCommand::NextAlbum).unwrap();
        assert_eq!(pod.position(), 3);
        io.simple.send(io.stream.as_mut(), SimpleCommand::NextAlbum).unwrap();
        assert_eq!(pod.position(), 5);
        io.simple.send(io.stream.as_mut(), SimpleCommand::SkipForward).unwrap();
        assert_eq!(pod.position(), 6);
        io.simple.send(io.stream.as_mut(), SimpleCommand::PreviousAlbum).unwrap();
        assert_eq!(pod.position(), 5);
        io.simple.send(io.stream.as_mut(), SimpleCommand::PreviousAlbum).unwrap();
        assert_eq!(pod.position(), 3);
    }

    #[test]
    fn polling_pushes_elapsed_time_while_playing() {
        let pod = SimulatedPod::with_demo_library();
        pod.attach();
        let mut io = pod.peripherals();
        io.advanced.enable(io.stream.as_mut()).unwrap();
        io.advanced
            .send(io.stream.as_mut(), AdvancedRequest::SetPolling(PollingMode::Start))
            .unwrap();
        io.stream.discard_input();

        pod.advance(1_000);
        assert_eq!(pod.pending_inbound(), 0);

        pod.set_status(PlaybackStatus::Playing);
        pod.advance(1_000);
        assert_eq!(pod.pending_inbound(), 2);
    }

    #[test]
    fn delay_moves_the_clock() {
        let pod = SimulatedPod::with_demo_library();
        let mut io = pod.peripherals();
        io.delay.delay_ms(50);
        assert_eq!(io.clock.now_ms(), 50);
    }
}
