use super::{
    codec::{MAX_FRAME_LEN, decode_frame, encode_frame},
    error::TransportError,
    mav_messages::{Identity, MavContent, MavFrame},
};
use async_trait::async_trait;
use std::{net::SocketAddr, time::Duration};
use tokio::{
    net::UdpSocket,
    sync::{Mutex, mpsc},
    time::timeout,
};

/// Send/receive primitives of a link endpoint.
///
/// Delivery may lose, duplicate or reorder frames; callers must not assume otherwise.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Stamps `content` with this endpoint's identity and transmits it.
    async fn send(&self, content: MavContent) -> Result<(), TransportError>;

    /// Waits at most `wait` for the next frame. `Ok(None)` means nothing arrived in time.
    /// A zero `wait` is a non-blocking poll.
    async fn recv_timeout(&self, wait: Duration) -> Result<Option<MavFrame>, TransportError>;
}

/// One datagram per frame over UDP to a fixed peer.
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
    identity: Identity,
}

impl UdpTransport {
    pub async fn bind(
        listen: SocketAddr,
        peer: SocketAddr,
        identity: Identity,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(listen).await?;
        Ok(Self { socket, peer, identity })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, content: MavContent) -> Result<(), TransportError> {
        let payload = encode_frame(&MavFrame::new(self.identity, content));
        self.socket.send_to(&payload, self.peer).await?;
        Ok(())
    }

    async fn recv_timeout(&self, wait: Duration) -> Result<Option<MavFrame>, TransportError> {
        let mut buffer = vec![0u8; MAX_FRAME_LEN];
        match timeout(wait, self.socket.recv_from(&mut buffer)).await {
            Err(_) => Ok(None),
            Ok(received) => {
                let (len, _) = received?;
                decode_frame(&buffer[..len]).map(Some)
            }
        }
    }
}

/// In-memory endpoint. Frames still pass through the codec so both ends see
/// exactly what a UDP peer would.
pub struct ChannelTransport {
    identity: Identity,
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl ChannelTransport {
    /// Creates two connected endpoints.
    pub fn pair(a: Identity, b: Identity) -> (ChannelTransport, ChannelTransport) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            ChannelTransport { identity: a, tx: a_tx, rx: Mutex::new(a_rx) },
            ChannelTransport { identity: b, tx: b_tx, rx: Mutex::new(b_rx) },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, content: MavContent) -> Result<(), TransportError> {
        let payload = encode_frame(&MavFrame::new(self.identity, content));
        self.tx.send(payload).map_err(|_| TransportError::Closed)
    }

    async fn recv_timeout(&self, wait: Duration) -> Result<Option<MavFrame>, TransportError> {
        let mut rx = self.rx.lock().await;
        match timeout(wait, rx.recv()).await {
            Err(_) => Ok(None),
            Ok(None) => Err(TransportError::Closed),
            Ok(Some(payload)) => decode_frame(&payload).map(Some),
        }
    }
}
