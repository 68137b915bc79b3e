use std::time::Duration;

/// What the reconnect countdown asks the client to do on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectStep {
    /// Not reconnecting
    Idle,
    /// Countdown still running
    Waiting,
    /// Make attempt number `n` (1-based) now
    Attempt(u32),
    /// Attempts exhausted; reconnection abandoned
    Exhausted,
}

/// Fixed-interval reconnection policy (no backoff, no jitter)
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    interval: Duration,
    attempts: u32,
    remaining: Duration,
    reconnecting: bool,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            attempts: 0,
            remaining: Duration::ZERO,
            reconnecting: false,
        }
    }

    /// Enter reconnecting mode. Returns false if already reconnecting.
    pub fn begin(&mut self) -> bool {
        if self.reconnecting {
            return false;
        }
        self.reconnecting = true;
        self.attempts = 0;
        self.remaining = self.interval;
        true
    }

    /// Advance the countdown by `delta`
    pub fn tick(&mut self, delta: Duration) -> ReconnectStep {
        if !self.reconnecting {
            return ReconnectStep::Idle;
        }

        self.remaining = self.remaining.saturating_sub(delta);
        if !self.remaining.is_zero() {
            return ReconnectStep::Waiting;
        }

        if self.is_exhausted() {
            self.reconnecting = false;
            return ReconnectStep::Exhausted;
        }

        self.attempts += 1;
        // Next attempt is scheduled whether or not this one succeeds
        self.remaining = self.interval;
        ReconnectStep::Attempt(self.attempts)
    }

    /// Connection opened: clear counters and leave reconnecting mode
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.remaining = Duration::ZERO;
        self.reconnecting = false;
    }

    /// Stop reconnecting without touching the attempt counter
    pub fn cancel(&mut self) {
        self.reconnecting = false;
        self.remaining = Duration::ZERO;
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn is_reconnecting(&self) -> bool {
        self.reconnecting
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
