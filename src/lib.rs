//! Host-side link to a serial-attached portable music player
//!
//! The host drives the accessory in one of two dialects: a stateless
//! "simple" remote-control protocol, or a request/response "advanced"
//! protocol that also reports status and track metadata. [`Accessory`]
//! tracks which dialect is live, keeps the advanced link alive, pulls
//! metadata for the current track and corrects the accessory's playing
//! state towards the one the host asked for.
//!
//! Wire codecs and hardware access are supplied by the embedder through
//! the traits in [`hal`] and [`protocol`]; [`sim`] provides an in-process
//! accessory that implements all of them.

pub mod config;
pub mod controller;
pub mod error;
pub mod hal;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod sim;

pub use config::LinkConfig;
pub use controller::{Accessory, AccessoryEvent, AccessoryListener};
pub use error::CodecError;
pub use hal::Peripherals;
pub use model::{DesiredDialect, Dialect, Mode, PlaybackRequest, PlaybackState, SequenceState, TrackMetadata};
