use super::vehicle_state::VehicleState;
use crate::common::Vec2D;
use crate::config::{CLIMB_MPS, HOME_LAT_DEG, HOME_LON_DEG, MOVE_MPS};

/// Kinematic stand-in for the airframe: altitude and horizontal position slew towards
/// their targets at bounded rates. No I/O and no clock; callers pass `dt`.
#[derive(Debug, Clone, Copy)]
pub struct FlightDynamics {
    climb_mps: f64,
    move_mps: f64,
    home_lat_deg: f64,
    home_lon_deg: f64,
}

impl Default for FlightDynamics {
    fn default() -> Self { Self::new(CLIMB_MPS, MOVE_MPS, (HOME_LAT_DEG, HOME_LON_DEG)) }
}

impl FlightDynamics {
    /// Altitude error below which the altitude snaps onto its target.
    pub const ALT_SNAP_M: f64 = 0.05;
    /// Horizontal error below which the position snaps onto its target.
    pub const POS_SNAP_M: f64 = 0.2;
    const M_PER_DEG_LAT: f64 = 111_320.0;
    /// Lower bound of `cos(lat)` used for the longitude scale.
    const MIN_LON_SCALE: f64 = 0.2;

    pub fn new(climb_mps: f64, move_mps: f64, home_deg: (f64, f64)) -> Self {
        Self { climb_mps, move_mps, home_lat_deg: home_deg.0, home_lon_deg: home_deg.1 }
    }

    /// Advances `state` by `dt` seconds. Negative `dt` is treated as zero.
    ///
    /// Returns `true` on the step where an active horizontal move reaches its target;
    /// `move_active` is cleared on that step.
    pub fn step(&self, state: &mut VehicleState, dt: f64) -> bool {
        let dt = dt.max(0.0);

        let alt_err = state.target_alt_m - state.rel_alt_m;
        if alt_err.abs() < Self::ALT_SNAP_M {
            state.rel_alt_m = state.target_alt_m;
        } else {
            let climb = self.climb_mps * dt;
            state.rel_alt_m = if alt_err > 0.0 {
                (state.rel_alt_m + climb).min(state.target_alt_m)
            } else {
                (state.rel_alt_m - climb).max(state.target_alt_m)
            };
        }

        if !state.move_active {
            return false;
        }
        let to_target = state.position.to(&state.target);
        let dist = to_target.abs();
        if dist < Self::POS_SNAP_M {
            state.position = state.target;
            state.move_active = false;
            return true;
        }
        let advance = (self.move_mps * dt).min(dist);
        state.position = state.position + to_target.normalize() * advance;
        false
    }

    /// Latitude and longitude in degrees of a local offset, flat-earth approximation.
    pub fn geodetic(&self, position: Vec2D<f64>) -> (f64, f64) {
        let lon_scale = self.home_lat_deg.to_radians().cos().max(Self::MIN_LON_SCALE);
        let lat = self.home_lat_deg + position.north() / Self::M_PER_DEG_LAT;
        let lon = self.home_lon_deg + position.east() / (Self::M_PER_DEG_LAT * lon_scale);
        (lat, lon)
    }
}
