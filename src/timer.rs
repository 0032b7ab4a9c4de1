//! Fixed-interval gravity source.

use std::time::{Duration, Instant};

pub const DEFAULT_TICK_MS: u64 = 1000;

/// Interval timer with `setInterval` semantics: deadlines fall on a fixed phase from
/// `start`, independent of when they are polled, and missed ones are dropped.
#[derive(Debug, Clone)]
pub struct GravityTimer {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl GravityTimer {
    /// Intervals below one millisecond are raised to one.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// (Re)schedules from `now`, replacing any pending deadline.
    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// True when a deadline has come due by `now`. Deadlines missed during a stall
    /// collapse into that single tick; the next one stays on the original phase.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(next) = self.next_tick else {
            return false;
        };
        if next > now {
            return false;
        }
        let behind = now.duration_since(next).as_nanos() / self.interval.as_nanos();
        let skip = u32::try_from(behind + 1).unwrap_or(u32::MAX);
        self.next_tick = Some(next + self.interval * skip);
        true
    }

    /// Time until the next deadline, or `None` when stopped.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|next| next.checked_duration_since(now).unwrap_or(Duration::ZERO))
    }
}

impl Default for GravityTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_MS))
    }
}
