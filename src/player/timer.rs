//! Single-threaded scheduling primitives: a fixed-rate interval timer and a
//! pausable playback clock. Both are driven by explicit `Instant`s so the
//! controller's polling stays deterministic and testable.

use std::time::{Duration, Instant};

/// Fixed-rate timer. Fires at most once per [`IntervalTimer::due`] call;
/// missed periods collapse rather than burst, since each tick derives the
/// current frame from the playback clock anyway.
#[derive(Clone, Copy, Debug)]
pub struct IntervalTimer {
    period: Duration,
    next: Instant,
}

impl IntervalTimer {
    /// First fire is one period after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

/// Pausable monotonic playback clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackClock {
    origin: Option<Instant>,
    base: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewind to zero and start running.
    pub fn reset_and_start(&mut self, now: Instant) {
        self.base = Duration::ZERO;
        self.origin = Some(now);
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(origin) = self.origin.take() {
            self.base += now.saturating_duration_since(origin);
        }
    }

    pub fn is_running(&self) -> bool {
        self.origin.is_some()
    }

    pub fn current_time_secs(&self, now: Instant) -> f64 {
        let elapsed = match self.origin {
            Some(origin) => self.base + now.saturating_duration_since(origin),
            None => self.base,
        };
        elapsed.as_secs_f64()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/timer.rs"]
mod tests;
