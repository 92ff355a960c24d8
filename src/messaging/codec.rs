use super::{error::TransportError, mav_messages::MavFrame};
use prost::Message;

/// Largest datagram a frame may occupy.
pub const MAX_FRAME_LEN: usize = 512;

/// Encodes one frame into one datagram payload.
pub fn encode_frame(frame: &MavFrame) -> Vec<u8> { frame.encode_to_vec() }

/// Decodes one datagram payload. Frames without content are rejected.
pub fn decode_frame(buf: &[u8]) -> Result<MavFrame, TransportError> {
    let frame = MavFrame::decode(buf)?;
    if frame.content.is_none() {
        return Err(TransportError::EmptyFrame);
    }
    Ok(frame)
}
