use chrono::{DateTime, TimeDelta, Utc};
use strum_macros::Display;

/// Edge of the link state, reported at most once per edge.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum LinkTransition {
    Lost,
    Restored,
}

/// Liveness of the counterpart, as inferred from this side's own observations.
///
/// Each process owns exactly one instance fed by the heartbeat stream it receives.
/// `up` only falls after the last contact is older than the timeout and only rises
/// again on a qualifying contact; both edges are reported once.
#[derive(Debug, Clone, Copy)]
pub struct LinkMonitor {
    last_contact: DateTime<Utc>,
    up: bool,
}

impl LinkMonitor {
    /// Starts in the `up` state, counting `now` as the last contact.
    pub fn new(now: DateTime<Utc>) -> Self { Self { last_contact: now, up: true } }

    pub fn is_up(&self) -> bool { self.up }

    pub fn last_contact(&self) -> DateTime<Utc> { self.last_contact }

    /// Time since the last qualifying contact.
    pub fn silence(&self, now: DateTime<Utc>) -> TimeDelta { now - self.last_contact }

    /// Records a qualifying message. Returns `Restored` if the link was down.
    ///
    /// Contacts older than the latest one (reordered delivery) do not move the timestamp back.
    pub fn record_contact(&mut self, now: DateTime<Utc>) -> Option<LinkTransition> {
        self.last_contact = self.last_contact.max(now);
        if self.up {
            None
        } else {
            self.up = true;
            Some(LinkTransition::Restored)
        }
    }

    /// Re-evaluates the timeout at `now`.
    ///
    /// # Arguments
    /// * `now` - Time of the check.
    /// * `timeout` - Longest tolerated silence; the link falls only once it is exceeded.
    ///
    /// # Returns
    /// Whether the link is up after the check, plus `Lost` the first time the silence
    /// exceeds `timeout`. Repeated checks while down report no further edge.
    pub fn check_timeout(
        &mut self,
        now: DateTime<Utc>,
        timeout: TimeDelta,
    ) -> (bool, Option<LinkTransition>) {
        if self.up && self.silence(now) > timeout {
            self.up = false;
            return (false, Some(LinkTransition::Lost));
        }
        (self.up, None)
    }
}
