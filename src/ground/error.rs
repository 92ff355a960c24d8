use crate::messaging::TransportError;
use crate::vehicle::FlightMode;
use strum_macros::Display;

/// Outcome of a ground command that was not transmitted successfully.
#[derive(Debug, Display)]
pub enum CommandError {
    /// The link was judged lost; nothing was transmitted.
    LinkLost,
    /// The mode cannot be requested from the ground.
    UnsupportedMode(FlightMode),
    Transport(TransportError),
}

impl std::error::Error for CommandError {}

impl From<TransportError> for CommandError {
    fn from(value: TransportError) -> Self { CommandError::Transport(value) }
}
