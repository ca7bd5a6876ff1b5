//! Hardware seams consumed by the accessory link
//!
//! The link never talks to a serial port, a GPIO line or a timer directly.
//! Everything it needs from the board is expressed as one of the small traits
//! below, so the same orchestration code runs on a real UART, over a USB
//! adapter, or against the in-process simulator.

use std::io;
use std::time::{Duration, Instant};

/// Half-duplex byte stream shared by both dialect codecs.
pub trait ByteStream {
    /// Number of inbound bytes that can be read without blocking.
    fn bytes_available(&self) -> usize;

    /// Read one inbound byte, if any.
    fn read(&mut self) -> Option<u8>;

    fn write(&mut self, byte: u8) -> io::Result<()>;

    /// Drop every buffered inbound byte.
    fn discard_input(&mut self);
}

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Digital input wired to the accessory's presence line.
pub trait PresencePin {
    fn is_asserted(&mut self) -> bool;
}

/// Blocking delay, used only for simple-dialect button timing.
pub trait Delay {
    fn delay_ms(&mut self, ms: u64);
}

/// [`Clock`] backed by [`Instant`], counting from construction.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// [`Delay`] that parks the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Everything the link needs from the outside world, handed over once.
pub struct Peripherals {
    pub stream: Box<dyn ByteStream>,
    pub presence: Box<dyn PresencePin>,
    pub clock: Box<dyn Clock>,
    pub delay: Box<dyn Delay>,
    pub simple: Box<dyn crate::protocol::SimpleCodec>,
    pub advanced: Box<dyn crate::protocol::AdvancedCodec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(second >= first);
    }
}
