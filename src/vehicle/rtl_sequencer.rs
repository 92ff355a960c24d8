use super::{
    outbox::Outbox,
    vehicle_state::{ModeEvent, RtlPhase, RtlProgress, RtlState, VehicleState},
};
use crate::common::Vec2D;
use crate::config::{RTL_ALT_M, RTL_HOME_RADIUS_M};
use crate::{info, link, warn};

/// Failsafe flight plan: climb to a safe altitude, fly home, land.
///
/// The sequencer only moves targets and phases; the dynamics integrator does the
/// flying and the controller's landing logic ends the plan on touchdown.
#[derive(Debug, Clone, Copy)]
pub struct RtlSequencer {
    state: RtlState,
    rtl_alt_m: f64,
    home_radius_m: f64,
}

impl Default for RtlSequencer {
    fn default() -> Self { Self::new(RTL_ALT_M, RTL_HOME_RADIUS_M) }
}

impl RtlSequencer {
    /// Tolerance for "arrived at the RTL altitude".
    const ALT_REACHED_M: f64 = 0.2;

    pub fn new(rtl_alt_m: f64, home_radius_m: f64) -> Self {
        Self { state: RtlState::default(), rtl_alt_m, home_radius_m }
    }

    pub fn state(&self) -> RtlState { self.state }

    /// Starts the plan from the current vehicle state and switches the mode to RTL.
    ///
    /// # Arguments
    /// * `vehicle` - The vehicle state; mode and targets are rewritten in place.
    /// * `out` - Outbox receiving the operator notice for the chosen first phase.
    ///
    /// A vehicle on the ground stays in `RtlPhase::Idle`. Below the RTL altitude the plan
    /// starts with `Climb`, otherwise directly with `Return`.
    pub fn start(&mut self, vehicle: &mut VehicleState, out: &mut Outbox) {
        self.state.active = true;
        vehicle.mode = vehicle.mode.apply(ModeEvent::FailsafeRtl);

        if !vehicle.flying {
            self.state.phase = RtlPhase::Idle;
            warn!("RTL: vehicle on the ground, nothing to return");
            out.warning("RTL: vehicle not flying (idle)");
            return;
        }

        if vehicle.rel_alt_m < self.rtl_alt_m {
            vehicle.target_alt_m = self.rtl_alt_m;
            self.state.phase = RtlPhase::Climb;
            link!("RTL: climbing to {:.1}m", self.rtl_alt_m);
            out.info(&format!("RTL: climbing to {:.1}m", self.rtl_alt_m));
        } else {
            self.state.phase = RtlPhase::Return;
            link!("RTL: returning to launch");
            out.info("RTL: returning to launch");
        }
        vehicle.target = Vec2D::zero();
        vehicle.move_active = true;
    }

    /// Evaluates the phase transition for this tick. No-op unless active and flying.
    ///
    /// # Arguments
    /// * `vehicle` - The vehicle state after this tick's dynamics step.
    /// * `out` - Outbox receiving a notice on every phase change.
    pub fn advance(&mut self, vehicle: &mut VehicleState, out: &mut Outbox) {
        if !self.state.active || !vehicle.flying {
            return;
        }
        let progress = RtlProgress {
            at_rtl_altitude: (vehicle.rel_alt_m - self.rtl_alt_m).abs() < Self::ALT_REACHED_M,
            home_reached: vehicle.position.in_radius_of(&Vec2D::zero(), self.home_radius_m)
                && !vehicle.move_active,
        };
        let next = self.state.phase.next(progress);
        if next == self.state.phase {
            return;
        }
        info!("RTL: {} -> {}", self.state.phase, next);
        self.state.phase = next;
        match next {
            RtlPhase::Return => out.info("RTL: returning to launch"),
            RtlPhase::Land => {
                vehicle.mode = vehicle.mode.apply(ModeEvent::RtlReachedHome);
                out.info("RTL: reached home, landing");
            }
            RtlPhase::Idle | RtlPhase::Climb => {}
        }
    }

    /// Abandons the plan (explicit GUIDED request, or touchdown).
    pub fn reset(&mut self) { self.state = RtlState::default(); }
}
