use std::time::{Duration, Instant};

/// One step of the cooperative scheduler.
///
/// Every poll in the crate (reconnect countdown, pump cadence) is driven by
/// a `Tick`; nothing reads the wall clock on its own.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Time of this tick
    pub now: Instant,
    /// Time elapsed since the previous tick
    pub delta: Duration,
}

/// Produces consecutive ticks from a monotonic clock
#[derive(Debug)]
pub struct Ticker {
    last: Instant,
}

impl Ticker {
    pub fn new(start: Instant) -> Self {
        Self { last: start }
    }

    /// Advance to `now`, returning the tick with the elapsed delta
    pub fn advance(&mut self, now: Instant) -> Tick {
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        Tick { now, delta }
    }
}
