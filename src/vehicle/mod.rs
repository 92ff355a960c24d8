//! Vehicle side: command acceptance, kinematic simulation, the return-to-launch
//! failsafe and the control loop that drives them.

mod error;
mod flight_dynamics;
mod flight_loop;
mod outbox;
mod rtl_sequencer;
mod vehicle_controller;
mod vehicle_state;

pub use error::VehicleError;
pub use flight_dynamics::FlightDynamics;
pub use flight_loop::{FlightLoop, run_vehicle};
pub use vehicle_controller::{DenyReason, Disposition, VehicleController};
pub use vehicle_state::{FlightMode, ModeEvent, RtlPhase, RtlProgress, RtlState, VehicleState};
