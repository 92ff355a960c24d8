//! Ground control side: the shared snapshot of what is known about the vehicle,
//! command gating on link state and the interactive console.

mod console;
mod error;
mod ground_session;
mod ground_snapshot;

pub use console::{ConsoleCommand, ParseError, execute, render_status, run_console};
pub use error::CommandError;
pub use ground_session::GroundSession;
pub use ground_snapshot::{GroundSnapshot, RxEvent, SessionStatus};

#[cfg(test)]
mod tests;
