//! Periodic work that runs independently of operator input: the shared running
//! flag and the ground side background workers. The vehicle side schedules its
//! heartbeat and timeout checks inside its single control loop.

mod ground_workers;
mod run_flag;

pub use ground_workers::{
    send_initial_heartbeats, spawn_ground_workers, spawn_heartbeat, spawn_link_watchdog,
    spawn_receiver,
};
pub use run_flag::RunFlag;

#[cfg(test)]
mod tests;
