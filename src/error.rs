use thiserror::Error;

/// Failures reported by a dialect codec.
///
/// These never cross the public API of [`crate::Accessory`]: the link logs
/// them and lets the liveness deadlines sort out whether the accessory is
/// still there.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec is not armed")]
    NotArmed,
    #[error("malformed frame: {0}")]
    Malformed(String),
}
