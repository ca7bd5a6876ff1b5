//! Model module - Link state and data types
//!
//! This module contains the state owned by the accessory link. It is
//! organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (mode, playback, sequencer state)
//! - `liveness`: Renewable advanced-mode deadline
//! - `metadata`: Track metadata and its retrieval chain
//! - `playback`: Requested vs. observed playback state
//! - `session`: The bundle reset on every disconnection

mod types;
mod liveness;
mod metadata;
mod playback;
mod session;

pub use types::{
    DesiredDialect, Dialect, Mode, PlaybackRequest, PlaybackState, SequenceState,
};

pub use liveness::{Expiry, Liveness};

pub use metadata::{MetadataSequencer, TrackMetadata};

pub use playback::PlaybackIntent;

pub(crate) use session::{Outbound, Session};
