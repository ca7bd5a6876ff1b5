//! Logical vocabulary of the two accessory dialects
//!
//! The wire encoding lives in the codecs; the link only deals in the
//! commands, requests and responses defined here.

use crate::error::CodecError;
use crate::hal::ByteStream;

/// Button events of the command-only dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimpleCommand {
    SkipForward,
    SkipBackward,
    NextAlbum,
    PreviousAlbum,
    /// Power/wake.
    PowerOn,
    JustPlay,
    JustPause,
    ButtonReleased,
}

/// Direct playback controls of the advanced dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackControl {
    PlayPause,
    Stop,
    SkipForward,
    SkipBackward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollingMode {
    Start,
    Stop,
}

/// Requests understood by the advanced dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvancedRequest {
    TimeAndStatus,
    PlaylistPosition,
    Title(u32),
    Artist(u32),
    Album(u32),
    SetPolling(PollingMode),
    Control(PlaybackControl),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Success,
    Failure,
    LimitExceeded,
    InvalidParameter,
    Other(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
    Other(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollingCommand {
    TrackChange,
    ElapsedTime,
    Other(u8),
}

/// Response handlers the link implements for the advanced codec.
pub trait AdvancedListener {
    fn on_feedback(&mut self, feedback: Feedback, command: u8);
    fn on_time_and_status(&mut self, track_length_ms: u32, elapsed_ms: u32, status: PlaybackStatus);
    fn on_playlist_position(&mut self, position: u32);
    fn on_title(&mut self, title: &str);
    fn on_artist(&mut self, artist: &str);
    fn on_album(&mut self, album: &str);
    fn on_polling(&mut self, command: PollingCommand, value: u32);
}

/// Encoder for the command-only dialect.
pub trait SimpleCodec {
    fn send(&mut self, stream: &mut dyn ByteStream, command: SimpleCommand) -> Result<(), CodecError>;
}

/// Encoder/decoder for the bidirectional dialect.
pub trait AdvancedCodec {
    /// Arm the codec; may write the dialect-switch command.
    fn enable(&mut self, stream: &mut dyn ByteStream) -> Result<(), CodecError>;

    /// Disarm the codec; after this it must not parse inbound data.
    fn disable(&mut self, stream: &mut dyn ByteStream) -> Result<(), CodecError>;

    fn send(&mut self, stream: &mut dyn ByteStream, request: AdvancedRequest) -> Result<(), CodecError>;

    /// Consume inbound data, invoking at most one listener method.
    fn poll(
        &mut self,
        stream: &mut dyn ByteStream,
        listener: &mut dyn AdvancedListener,
    ) -> Result<(), CodecError>;
}
