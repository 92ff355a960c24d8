use crate::common::Vec2D;
use strum_macros::{Display, EnumString};

/// Operating mode of the vehicle.
#[derive(Debug, Display, EnumString, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FlightMode {
    Standby,
    Guided,
    Loiter,
    Land,
    Rtl,
}

/// Inputs of the mode state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// Mode change requested by the ground.
    Requested(FlightMode),
    /// A land command was accepted.
    LandAccepted,
    /// Link loss failsafe started the return-to-launch plan.
    FailsafeRtl,
    /// The return-to-launch plan arrived over home.
    RtlReachedHome,
    /// The landing descent reached the ground.
    TouchedDown,
}

impl FlightMode {
    /// Maps an ArduCopter-style custom mode number. Unknown numbers select `Standby`.
    pub fn from_custom_mode(custom_mode: u32) -> Self {
        match custom_mode {
            4 => FlightMode::Guided,
            5 => FlightMode::Loiter,
            9 => FlightMode::Land,
            _ => FlightMode::Standby,
        }
    }

    /// Custom mode number the ground sends to request this mode, if it can be requested.
    pub fn custom_mode(self) -> Option<u32> {
        match self {
            FlightMode::Guided => Some(4),
            FlightMode::Loiter => Some(5),
            FlightMode::Land => Some(9),
            FlightMode::Standby | FlightMode::Rtl => None,
        }
    }

    /// The mode transition function.
    pub fn apply(self, event: ModeEvent) -> FlightMode {
        match (self, event) {
            (_, ModeEvent::Requested(mode)) => mode,
            (_, ModeEvent::LandAccepted | ModeEvent::RtlReachedHome) => FlightMode::Land,
            (_, ModeEvent::FailsafeRtl) => FlightMode::Rtl,
            (FlightMode::Land, ModeEvent::TouchedDown) => FlightMode::Standby,
            (
                mode @ (FlightMode::Standby | FlightMode::Guided | FlightMode::Loiter | FlightMode::Rtl),
                ModeEvent::TouchedDown,
            ) => mode,
        }
    }
}

/// Phase of the return-to-launch plan.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RtlPhase {
    Idle,
    Climb,
    Return,
    Land,
}

/// What the sequencer observed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtlProgress {
    pub at_rtl_altitude: bool,
    pub home_reached: bool,
}

impl RtlPhase {
    /// The phase transition function. `Land` is terminal, touchdown is handled by the
    /// landing logic which resets the plan.
    pub fn next(self, progress: RtlProgress) -> RtlPhase {
        match self {
            RtlPhase::Idle => RtlPhase::Idle,
            RtlPhase::Climb if progress.at_rtl_altitude => RtlPhase::Return,
            RtlPhase::Climb => RtlPhase::Climb,
            RtlPhase::Return if progress.home_reached => RtlPhase::Land,
            RtlPhase::Return => RtlPhase::Return,
            RtlPhase::Land => RtlPhase::Land,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtlState {
    pub active: bool,
    pub phase: RtlPhase,
}

impl Default for RtlState {
    fn default() -> Self { Self { active: false, phase: RtlPhase::Idle } }
}

/// Everything the vehicle knows about itself. Owned by the controller and mutated only
/// by command handlers, the dynamics integrator and the RTL sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub armed: bool,
    pub flying: bool,
    pub mode: FlightMode,
    /// Offset from the launch point.
    pub position: Vec2D<f64>,
    /// Altitude above the launch point in meters.
    pub rel_alt_m: f64,
    /// Horizontal target, meaningful while `move_active`.
    pub target: Vec2D<f64>,
    pub target_alt_m: f64,
    pub move_active: bool,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            armed: false,
            flying: false,
            mode: FlightMode::Standby,
            position: Vec2D::zero(),
            rel_alt_m: 0.0,
            target: Vec2D::zero(),
            target_alt_m: 0.0,
            move_active: false,
        }
    }
}

impl VehicleState {
    /// Above the height where disarming is refused.
    pub fn is_airborne(&self) -> bool { self.flying && self.rel_alt_m > 0.5 }
}
