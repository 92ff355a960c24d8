use strum_macros::Display;

/// Failure of the message transport. Loops treat every variant except `Closed` as transient.
#[derive(Debug, Display)]
pub enum TransportError {
    Io(std::io::Error),
    Decode(prost::DecodeError),
    /// A well-formed frame without content.
    EmptyFrame,
    /// The peer side of an in-memory link was dropped.
    Closed,
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(value: std::io::Error) -> Self { TransportError::Io(value) }
}

impl From<prost::DecodeError> for TransportError {
    fn from(value: prost::DecodeError) -> Self { TransportError::Decode(value) }
}
