//! Renewable advanced-mode deadline
//!
//! The accessory has no heartbeat of its own. Every accepted response pushes
//! the deadline out by one window; a missed deadline is absorbed `grace`
//! times (re-arming for another window) before the link is declared lost.

/// Outcome of checking the deadline on a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Deadline not reached, or not armed.
    Alive,
    /// Deadline missed, absorbed by the grace budget.
    Grace { misses: u8 },
    Lost,
}

#[derive(Clone, Debug)]
pub struct Liveness {
    window_ms: u64,
    grace: u8,
    expiry: Option<u64>,
    misses: u8,
}

impl Liveness {
    pub fn new(window_ms: u64, grace: u8) -> Self {
        Self {
            window_ms,
            grace,
            expiry: None,
            misses: 0,
        }
    }

    /// Start tracking from `now`.
    pub fn arm(&mut self, now: u64) {
        self.expiry = Some(now.saturating_add(self.window_ms));
        self.misses = 0;
    }

    /// Push the deadline out; no-op while disarmed.
    pub fn renew(&mut self, now: u64) {
        if self.expiry.is_some() {
            self.arm(now);
        }
    }

    pub fn disarm(&mut self) {
        self.expiry = None;
        self.misses = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.expiry.is_some()
    }

    pub fn expiry(&self) -> Option<u64> {
        self.expiry
    }

    pub fn misses(&self) -> u8 {
        self.misses
    }

    /// Milliseconds left before the deadline, zero once it has passed.
    pub fn remaining(&self, now: u64) -> Option<u64> {
        self.expiry.map(|expiry| expiry.saturating_sub(now))
    }

    pub fn check(&mut self, now: u64) -> Expiry {
        let Some(expiry) = self.expiry else {
            return Expiry::Alive;
        };
        if now <= expiry {
            return Expiry::Alive;
        }
        if self.misses < self.grace {
            self.misses += 1;
            self.expiry = Some(now.saturating_add(self.window_ms));
            Expiry::Grace { misses: self.misses }
        } else {
            Expiry::Lost
        }
    }

    /// Keep-alive is due once less than `margin` remains.
    pub fn keepalive_due(&self, now: u64, margin: u64) -> bool {
        self.remaining(now).is_some_and(|left| left < margin)
    }
}
