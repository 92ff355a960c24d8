use crate::messaging::TransportError;
use strum_macros::Display;

#[derive(Debug, Display)]
pub enum VehicleError {
    /// Nothing was received during the startup window.
    HandshakeTimeout,
    Transport(TransportError),
}

impl std::error::Error for VehicleError {}

impl From<TransportError> for VehicleError {
    fn from(value: TransportError) -> Self { VehicleError::Transport(value) }
}
