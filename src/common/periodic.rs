use chrono::{DateTime, TimeDelta, Utc};

/// A fixed-period deadline for work that is polled from a loop rather than driven by a timer.
///
/// The first call to [`Periodic::due`] always fires; afterwards it fires whenever at least
/// one `period` has elapsed since the last firing.
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    period: TimeDelta,
    last: Option<DateTime<Utc>>,
}

impl Periodic {
    pub fn new(period: TimeDelta) -> Self { Self { period, last: None } }

    /// Returns `true` and re-arms if the deadline has passed at `now`.
    pub fn due(&mut self, now: DateTime<Utc>) -> bool {
        match self.last {
            Some(last) if now - last < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forgets the last firing so the next poll fires immediately.
    pub fn reset(&mut self) { self.last = None; }
}
