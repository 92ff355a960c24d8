use super::{
    flight_dynamics::FlightDynamics,
    outbox::Outbox,
    rtl_sequencer::RtlSequencer,
    vehicle_state::{FlightMode, ModeEvent, RtlState, VehicleState},
};
use crate::common::{Periodic, Vec2D};
use crate::config::{GCS_SYSTEM_ID, UAV_LINK_TIMEOUT, UAV_RETRY_NOTICE_PERIOD};
use crate::link::{LinkMonitor, LinkTransition};
use crate::messaging::{
    GlobalPositionInt, MAV_CMD_COMPONENT_ARM_DISARM, MAV_CMD_NAV_LAND, MAV_CMD_NAV_TAKEOFF,
    MAV_TYPE_GCS, MavContent, MavFrame, MavResult, POSITION_TARGET_IGNORE_X,
    POSITION_TARGET_IGNORE_Y, POSITION_TARGET_IGNORE_Z, SetPositionTargetLocalNed,
};
use crate::{event, info, link, log, warn};
use chrono::{DateTime, TimeDelta, Utc};
use strum_macros::Display;

/// Why a command was refused. The text is what follows "denied: " in the status message.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    #[strum(serialize = "airborne")]
    Airborne,
    #[strum(serialize = "not armed")]
    NotArmed,
    #[strum(serialize = "not GUIDED")]
    NotGuided,
    #[strum(serialize = "already flying")]
    AlreadyFlying,
    #[strum(serialize = "altitude too low")]
    AltitudeTooLow,
    #[strum(serialize = "not flying")]
    NotFlying,
    #[strum(serialize = "invalid target")]
    InvalidTarget,
}

/// How one command was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accepted,
    Denied(DenyReason),
    Unsupported,
    /// The link was down, the command was discarded without an answer.
    Dropped,
}

/// Vehicle-side command acceptance and failsafe supervision.
///
/// All methods are synchronous and non-blocking. Answers are queued in the outbox and
/// flushed by the control loop.
#[derive(Debug)]
pub struct VehicleController {
    state: VehicleState,
    rtl: RtlSequencer,
    dynamics: FlightDynamics,
    link: LinkMonitor,
    link_timeout: TimeDelta,
    retry_notice: Periodic,
    outbox: Outbox,
}

impl VehicleController {
    /// Minimum accepted takeoff altitude, exclusive.
    const MIN_TAKEOFF_ALT_M: f64 = 0.5;

    /// Creates a grounded, disarmed vehicle whose link counts as fresh at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_parts(now, FlightDynamics::default(), RtlSequencer::default(), UAV_LINK_TIMEOUT)
    }

    pub fn with_parts(
        now: DateTime<Utc>,
        dynamics: FlightDynamics,
        rtl: RtlSequencer,
        link_timeout: TimeDelta,
    ) -> Self {
        Self {
            state: VehicleState::default(),
            rtl,
            dynamics,
            link: LinkMonitor::new(now),
            link_timeout,
            retry_notice: Periodic::new(UAV_RETRY_NOTICE_PERIOD),
            outbox: Outbox::default(),
        }
    }

    pub fn state(&self) -> &VehicleState { &self.state }

    pub fn rtl_state(&self) -> RtlState { self.rtl.state() }

    pub fn link(&self) -> &LinkMonitor { &self.link }

    /// Takes all queued acknowledgements and status texts.
    pub fn drain_outbox(&mut self) -> Vec<MavContent> { self.outbox.drain() }

    /// One control step: link timeout, landing target, dynamics, RTL phase, touchdown.
    pub fn tick(&mut self, now: DateTime<Utc>, dt: f64) {
        self.supervise_link(now);

        if self.state.flying && self.state.mode == FlightMode::Land {
            self.state.target_alt_m = 0.0;
        }

        if self.state.flying && self.dynamics.step(&mut self.state, dt) {
            info!("Reached target {}", self.state.position);
            self.outbox.info("Reached target position");
        }

        self.rtl.advance(&mut self.state, &mut self.outbox);

        if self.state.flying
            && self.state.mode == FlightMode::Land
            && self.state.rel_alt_m <= FlightDynamics::ALT_SNAP_M
        {
            self.state.rel_alt_m = 0.0;
            self.state.flying = false;
            self.state.move_active = false;
            self.rtl.reset();
            self.state.mode = self.state.mode.apply(ModeEvent::TouchedDown);
            info!("Landed");
            self.outbox.info("Landed");
        }
    }

    fn supervise_link(&mut self, now: DateTime<Utc>) {
        let (up, edge) = self.link.check_timeout(now, self.link_timeout);
        if edge == Some(LinkTransition::Lost) {
            link!(
                "FAILSAFE: no GCS heartbeat for {}s, entering RTL",
                self.link.silence(now).num_seconds()
            );
            self.outbox.critical("GCS HEARTBEAT LOST - RTL");
            self.rtl.start(&mut self.state, &mut self.outbox);
            self.retry_notice.reset();
        }
        if !up && self.retry_notice.due(now) {
            log!("Attempting link restore, waiting for GCS heartbeat...");
            self.outbox.warning("Attempting link restore...");
        }
    }

    /// Dispatches one inbound frame. GCS heartbeats refresh the link; everything
    /// else is a command and is discarded while the link is down.
    pub fn handle_frame(&mut self, now: DateTime<Utc>, frame: &MavFrame) {
        let Some(content) = &frame.content else {
            return;
        };
        match content {
            MavContent::Heartbeat(hb) => {
                if hb.mav_type == MAV_TYPE_GCS || frame.system_id == GCS_SYSTEM_ID {
                    event!("GCS heartbeat from system {}", frame.system_id);
                    if self.link.record_contact(now) == Some(LinkTransition::Restored) {
                        link!("Link restored: GCS heartbeat is back");
                        self.outbox.info("GCS HEARTBEAT RESTORED");
                    }
                }
            }
            MavContent::SetMode(req) => {
                log!("received {} | {req:?}", content.kind());
                self.set_mode(req.custom_mode);
            }
            MavContent::CommandLong(cmd) => {
                log!("received {} | {cmd:?}", content.kind());
                match cmd.command {
                    MAV_CMD_COMPONENT_ARM_DISARM => self.arm(f64::from(cmd.param1)),
                    MAV_CMD_NAV_TAKEOFF => self.takeoff(f64::from(cmd.param7)),
                    MAV_CMD_NAV_LAND => self.land(),
                    other => self.unsupported(other),
                };
            }
            MavContent::SetPositionTargetLocalNed(target) => {
                log!("received {} | {target:?}", content.kind());
                self.move_to_target(target);
            }
            MavContent::CommandAck(_) | MavContent::GlobalPositionInt(_) | MavContent::StatusText(_) => {
                event!("ignoring {} from system {}", content.kind(), frame.system_id);
            }
        }
    }

    fn accepts_commands(&self, kind: &str) -> bool {
        if !self.link.is_up() {
            warn!("Link down, dropping {kind}");
        }
        self.link.is_up()
    }

    fn deny(&mut self, command: u32, what: &str, reason: DenyReason) -> Disposition {
        warn!("{what} denied: {reason}");
        self.outbox.ack(command, MavResult::Denied);
        self.outbox.warning(&format!("{what} denied: {reason}"));
        Disposition::Denied(reason)
    }

    /// `value >= 1` arms, anything else disarms.
    pub fn arm(&mut self, value: f64) -> Disposition {
        const CMD: u32 = MAV_CMD_COMPONENT_ARM_DISARM;
        if !self.accepts_commands("ARM_DISARM") {
            return Disposition::Dropped;
        }
        if value >= 1.0 {
            self.outbox.ack(CMD, MavResult::Accepted);
            if self.state.armed {
                self.outbox.info("Already armed");
            } else {
                self.state.armed = true;
                info!("Motors armed");
                self.outbox.info("Motors armed");
            }
            return Disposition::Accepted;
        }
        if self.state.is_airborne() {
            return self.deny(CMD, "Disarm", DenyReason::Airborne);
        }
        self.state.armed = false;
        info!("Motors disarmed");
        self.outbox.ack(CMD, MavResult::Accepted);
        self.outbox.info("Motors disarmed");
        Disposition::Accepted
    }

    pub fn takeoff(&mut self, target_alt_m: f64) -> Disposition {
        const CMD: u32 = MAV_CMD_NAV_TAKEOFF;
        if !self.accepts_commands("TAKEOFF") {
            return Disposition::Dropped;
        }
        let violated = if !self.state.armed {
            Some(DenyReason::NotArmed)
        } else if self.state.mode != FlightMode::Guided {
            Some(DenyReason::NotGuided)
        } else if self.state.flying {
            Some(DenyReason::AlreadyFlying)
        } else if !target_alt_m.is_finite() {
            Some(DenyReason::InvalidTarget)
        } else if target_alt_m <= Self::MIN_TAKEOFF_ALT_M {
            Some(DenyReason::AltitudeTooLow)
        } else {
            None
        };
        if let Some(reason) = violated {
            return self.deny(CMD, "Takeoff", reason);
        }
        self.state.flying = true;
        self.state.target_alt_m = target_alt_m;
        info!("Taking off to {target_alt_m:.1}m");
        self.outbox.ack(CMD, MavResult::Accepted);
        self.outbox.info(&format!("Taking off to {target_alt_m:.1}m"));
        Disposition::Accepted
    }

    pub fn land(&mut self) -> Disposition {
        const CMD: u32 = MAV_CMD_NAV_LAND;
        if !self.accepts_commands("LAND") {
            return Disposition::Dropped;
        }
        if !self.state.flying {
            return self.deny(CMD, "Land", DenyReason::NotFlying);
        }
        self.state.mode = self.state.mode.apply(ModeEvent::LandAccepted);
        info!("Landing");
        self.outbox.ack(CMD, MavResult::Accepted);
        self.outbox.info("Landing...");
        Disposition::Accepted
    }

    /// Mode changes are not safety-gated; they are answered with a status text only.
    /// Entering GUIDED abandons an active RTL plan.
    pub fn set_mode(&mut self, custom_mode: u32) -> Disposition {
        if !self.accepts_commands("SET_MODE") {
            return Disposition::Dropped;
        }
        let requested = FlightMode::from_custom_mode(custom_mode);
        self.state.mode = self.state.mode.apply(ModeEvent::Requested(requested));
        if requested == FlightMode::Guided && self.rtl.state().active {
            link!("GUIDED requested, RTL cancelled");
            self.rtl.reset();
        }
        info!("Mode is now {}", self.state.mode);
        self.outbox.info("Mode change requested");
        Disposition::Accepted
    }

    /// Horizontal move in the local NED frame. Altitude is only ever raised by a move.
    /// Non-finite coordinates are refused, the current target is kept.
    pub fn move_to(&mut self, north_m: f64, east_m: f64, down_m: f64) -> Disposition {
        if !self.accepts_commands("SET_POSITION_TARGET_LOCAL_NED") {
            return Disposition::Dropped;
        }
        let violated = if !self.state.flying {
            Some(DenyReason::NotFlying)
        } else if self.state.mode != FlightMode::Guided {
            Some(DenyReason::NotGuided)
        } else if !(north_m.is_finite() && east_m.is_finite() && down_m.is_finite()) {
            Some(DenyReason::InvalidTarget)
        } else {
            None
        };
        if let Some(reason) = violated {
            warn!("Move denied: {reason}");
            self.outbox.warning(&format!("Move denied: {reason}"));
            return Disposition::Denied(reason);
        }
        self.state.target = Vec2D::new(north_m, east_m);
        self.state.move_active = true;
        let desired_alt_m = (-down_m).max(0.0);
        if desired_alt_m > self.state.target_alt_m {
            self.state.target_alt_m = desired_alt_m;
        }
        let text = format!(
            "Moving to N={north_m:.1} E={east_m:.1} alt~{:.1}m",
            self.state.target_alt_m
        );
        info!("{text}");
        self.outbox.info(&text);
        Disposition::Accepted
    }

    /// Applies a position target, keeping the current target for every axis the type
    /// mask marks as ignored.
    fn move_to_target(&mut self, target: &SetPositionTargetLocalNed) -> Disposition {
        let pick = |bit: u32, given: f32, current: f64| {
            if target.type_mask & bit == 0 { f64::from(given) } else { current }
        };
        let north = pick(POSITION_TARGET_IGNORE_X, target.x, self.state.target.north());
        let east = pick(POSITION_TARGET_IGNORE_Y, target.y, self.state.target.east());
        let down = pick(POSITION_TARGET_IGNORE_Z, target.z, -self.state.target_alt_m);
        self.move_to(north, east, down)
    }

    pub fn unsupported(&mut self, command: u32) -> Disposition {
        if !self.accepts_commands("COMMAND_LONG") {
            return Disposition::Dropped;
        }
        warn!("Unsupported command {command}");
        self.outbox.ack(command, MavResult::Unsupported);
        Disposition::Unsupported
    }

    /// Position report for the current state. `boot_ms` is the time since vehicle start.
    #[allow(clippy::cast_possible_truncation)]
    pub fn position_report(&self, boot_ms: u32) -> MavContent {
        let (lat, lon) = self.dynamics.geodetic(self.state.position);
        let rel_alt_mm = (self.state.rel_alt_m * 1000.0) as i32;
        MavContent::GlobalPositionInt(GlobalPositionInt {
            time_boot_ms: boot_ms,
            lat: (lat * 1e7) as i32,
            lon: (lon * 1e7) as i32,
            alt: rel_alt_mm,
            relative_alt: rel_alt_mm,
        })
    }
}
