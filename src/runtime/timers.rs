use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);
const MAX_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// A fixed-period timer polled by the event loop.
///
/// A late poll fires once and reschedules from `now`; missed periods are
/// dropped rather than replayed in a burst.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        let period = period.clamp(MIN_PERIOD, MAX_PERIOD);
        Self {
            period,
            next_due: now + period,
        }
    }

    pub fn from_millis(ms: u64, now: Instant) -> Self {
        Self::new(Duration::from_millis(ms), now)
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Returns true when the timer is due at `now` and schedules the next run.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        true
    }
}
