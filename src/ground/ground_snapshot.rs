use crate::link::{LinkMonitor, LinkTransition};
use crate::messaging::{CommandAck, GlobalPositionInt, MavContent, MavFrame, StatusText};
use chrono::{DateTime, TimeDelta, Utc};
use std::{collections::VecDeque, fmt};

/// Inbound message worth showing to the operator before the next prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum RxEvent {
    Ack(CommandAck),
    Status(StatusText),
}

impl fmt::Display for RxEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RxEvent::Ack(ack) => write!(
                f,
                "COMMAND_ACK | command={} result={}",
                ack.command,
                ack.result().as_str_name()
            ),
            RxEvent::Status(st) => {
                write!(f, "STATUSTEXT | [{}] {}", st.severity().as_str_name(), st.text)
            }
        }
    }
}

/// Copy of the operator-visible part of the snapshot, taken under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub last_position: Option<GlobalPositionInt>,
    pub last_ack: Option<CommandAck>,
    pub last_status: Option<StatusText>,
    pub link_up: bool,
    pub stopped: bool,
}

impl SessionStatus {
    /// True if commands would currently be refused.
    pub fn is_down(&self) -> bool { self.stopped || !self.link_up }
}

/// Everything the ground knows about the vehicle and the link. The session keeps it
/// behind a single lock; every method here assumes that lock is held.
#[derive(Debug)]
pub struct GroundSnapshot {
    last_position: Option<GlobalPositionInt>,
    last_ack: Option<CommandAck>,
    last_status: Option<StatusText>,
    link: LinkMonitor,
    stopped: bool,
    events: VecDeque<RxEvent>,
}

impl GroundSnapshot {
    /// Oldest events are dropped beyond this many.
    pub const MAX_EVENTS: usize = 200;

    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_position: None,
            last_ack: None,
            last_status: None,
            link: LinkMonitor::new(now),
            stopped: false,
            events: VecDeque::with_capacity(Self::MAX_EVENTS),
        }
    }

    /// Commands and heartbeats may only go out while this holds.
    pub fn can_send(&self) -> bool { !self.stopped && self.link.is_up() }

    pub fn is_stopped(&self) -> bool { self.stopped }

    pub fn link(&self) -> &LinkMonitor { &self.link }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            last_position: self.last_position,
            last_ack: self.last_ack,
            last_status: self.last_status.clone(),
            link_up: self.link.is_up(),
            stopped: self.stopped,
        }
    }

    /// Caches telemetry from one inbound frame and refreshes the contact time.
    /// Returns `false` for frames the ground does not expect from a vehicle.
    ///
    /// Once stopped, contact is no longer recorded and the link stays down.
    pub fn ingest(&mut self, now: DateTime<Utc>, frame: &MavFrame) -> bool {
        let Some(content) = &frame.content else {
            return false;
        };
        match content {
            MavContent::Heartbeat(_) => {}
            MavContent::GlobalPositionInt(pos) => self.last_position = Some(*pos),
            MavContent::CommandAck(ack) => {
                self.last_ack = Some(*ack);
                self.push_event(RxEvent::Ack(*ack));
            }
            MavContent::StatusText(st) => {
                self.last_status = Some(st.clone());
                self.push_event(RxEvent::Status(st.clone()));
            }
            MavContent::CommandLong(_)
            | MavContent::SetMode(_)
            | MavContent::SetPositionTargetLocalNed(_) => return false,
        }
        if !self.stopped {
            self.link.record_contact(now);
        }
        true
    }

    /// Evaluates the link timeout. The first `Lost` edge latches `stopped` for good.
    pub fn check_link(&mut self, now: DateTime<Utc>, timeout: TimeDelta) -> Option<LinkTransition> {
        let (_, edge) = self.link.check_timeout(now, timeout);
        if edge == Some(LinkTransition::Lost) {
            self.stopped = true;
        }
        edge
    }

    fn push_event(&mut self, event: RxEvent) {
        if self.events.len() == Self::MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Removes up to `max` of the oldest queued events.
    pub fn drain_events(&mut self, max: usize) -> Vec<RxEvent> {
        let n = max.min(self.events.len());
        self.events.drain(..n).collect()
    }
}
