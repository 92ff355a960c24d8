//! Typed message vocabulary exchanged between ground and vehicle, its wire codec
//! and the transports that carry it. The link supervision and command logic only
//! ever see `MavFrame`/`MavContent` values and the [`Transport`] trait.

mod codec;
mod error;
mod mav_messages;
mod transport;

pub use codec::{decode_frame, encode_frame};
pub use error::TransportError;
pub use mav_messages::*;
pub use transport::{ChannelTransport, Transport, UdpTransport};
