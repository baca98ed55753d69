//! TCP link to the peer.
//!
//! Provides [`Link`], which carries encoded [`TransferFrame`]s over one TCP
//! stream. Each frame is one message behind a 4-byte big-endian length
//! prefix. The link is a thin layer: it moves frames and nothing else, all
//! transfer logic stays in the sans-IO core.

use std::{fmt, net::SocketAddr};

use ferry_proto::{MAX_FRAME_SIZE, ProtocolError, TransferFrame};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    task::AbortHandle,
};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

const LENGTH_PREFIX_SIZE: usize = 4;

/// Link errors.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// How the link to the peer is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMode {
    /// Accept the peer on this address.
    Listen(SocketAddr),
    /// Dial the peer at this address.
    Connect(String),
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listen(addr) => write!(f, "listening on {addr}"),
            Self::Connect(addr) => write!(f, "connecting to {addr}"),
        }
    }
}

/// Codec for the 4-byte big-endian length prefix.
pub fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(LENGTH_PREFIX_SIZE)
        .big_endian()
        .max_frame_length(MAX_FRAME_SIZE)
        .new_codec()
}

/// Wait for a TCP stream to the peer.
///
/// In listen mode the first accepted connection wins.
///
/// # Errors
///
/// Returns an error if binding, accepting or connecting fails.
pub async fn establish(mode: LinkMode) -> Result<(TcpStream, SocketAddr), LinkError> {
    let (stream, peer) = match mode {
        LinkMode::Listen(addr) => {
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(addr = %listener.local_addr()?, "waiting for peer");
            listener.accept().await?
        },
        LinkMode::Connect(addr) => {
            let stream = TcpStream::connect(&addr).await?;
            let peer = stream.peer_addr()?;
            (stream, peer)
        },
    };

    stream.set_nodelay(true)?;
    tracing::info!(%peer, "peer link established");
    Ok((stream, peer))
}

/// Frame link over an established TCP stream.
///
/// Outbound frames are written directly by [`Link::send`]; an internal task
/// decodes inbound messages and queues them for [`Link::recv`]. The inbound
/// queue is unbounded so the socket keeps draining while the local side is
/// busy sending.
pub struct Link {
    peer: SocketAddr,
    writer: FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>,
    inbound: mpsc::UnboundedReceiver<TransferFrame>,
    abort_handle: AbortHandle,
}

impl Link {
    /// Start the link over `stream`.
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        let (read, write) = stream.into_split();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(read_frames(FramedRead::new(read, codec()), inbound_tx, peer));

        Self {
            peer,
            writer: FramedWrite::new(write, codec()),
            inbound: inbound_rx,
            abort_handle: handle.abort_handle(),
        }
    }

    /// Address of the peer.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Encode and write one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be encoded or the write fails.
    pub async fn send(&mut self, frame: &TransferFrame) -> Result<(), LinkError> {
        let bytes = frame.to_bytes()?;
        let len = bytes.len();
        self.writer.send(bytes).await?;
        tracing::debug!(peer = %self.peer, kind = %frame.kind(), len, "frame sent");
        Ok(())
    }

    /// Next inbound frame. `None` once the peer closed the link.
    pub async fn recv(&mut self) -> Option<TransferFrame> {
        self.inbound.recv().await
    }

    /// Stop the inbound task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decode inbound messages until the stream ends or the receiver goes away.
async fn read_frames(
    mut reader: FramedRead<OwnedReadHalf, LengthDelimitedCodec>,
    inbound: mpsc::UnboundedSender<TransferFrame>,
    peer: SocketAddr,
) {
    while let Some(message) = reader.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(%peer, error = %e, "link read failed");
                break;
            },
        };

        match TransferFrame::decode(&message) {
            Ok(frame) => {
                if inbound.send(frame).is_err() {
                    break;
                }
            },
            Err(e) => {
                tracing::warn!(%peer, error = %e, len = message.len(), "dropping malformed frame");
            },
        }
    }

    tracing::info!(%peer, "peer link closed");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use chrono::{TimeZone, Utc};

    use super::*;

    async fn pair() -> (Link, Link) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (dialed, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (accepted, peer) = accepted.unwrap();

        (Link::new(dialed.unwrap(), addr), Link::new(accepted, peer))
    }

    #[tokio::test]
    async fn frames_arrive_in_order() {
        let (mut a, mut b) = pair().await;
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        a.send(&TransferFrame::text("one", at)).await.unwrap();
        a.send(&TransferFrame::file("f.bin", None, Bytes::from_static(b"xyz"))).await.unwrap();

        assert_eq!(b.recv().await, Some(TransferFrame::text("one", at)));
        let Some(TransferFrame::File(file)) = b.recv().await else {
            panic!("expected a file frame");
        };
        assert_eq!((file.name.as_str(), file.payload.as_ref()), ("f.bin", b"xyz".as_slice()));
    }

    async fn send_files(link: &mut Link, count: usize, payload: Bytes) {
        for i in 0..count {
            let frame = TransferFrame::file(format!("f{i}.bin"), None, payload.clone());
            link.send(&frame).await.unwrap();
        }
    }

    #[tokio::test]
    async fn both_peers_send_batches_at_once() {
        let (mut a, mut b) = pair().await;
        let payload = Bytes::from(vec![7u8; 1 << 20]);

        // Neither side reads until both batches are written.
        let sent = tokio::time::timeout(Duration::from_secs(10), async {
            tokio::join!(
                send_files(&mut a, 64, payload.clone()),
                send_files(&mut b, 64, payload.clone())
            )
        })
        .await;
        assert!(sent.is_ok(), "concurrent sends stalled");

        for link in [&mut a, &mut b] {
            for i in 0..64 {
                let Some(TransferFrame::File(file)) = link.recv().await else {
                    panic!("expected file frame {i}");
                };
                assert_eq!(file.name, format!("f{i}.bin"));
                assert_eq!(file.payload.len(), 1 << 20);
            }
        }
    }

    #[tokio::test]
    async fn malformed_message_is_skipped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (raw, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (accepted, peer) = accepted.unwrap();
        let mut link = Link::new(accepted, peer);

        let mut raw = FramedWrite::new(raw.unwrap(), codec());
        raw.send(Bytes::from_static(b"\xff\x00 not cbor")).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        raw.send(TransferFrame::text("ok", at).to_bytes().unwrap()).await.unwrap();

        assert_eq!(link.recv().await, Some(TransferFrame::text("ok", at)));
    }

    #[tokio::test]
    async fn recv_ends_when_peer_closes() {
        let (a, mut b) = pair().await;
        drop(a);

        assert_eq!(b.recv().await, None);
    }

    #[tokio::test]
    async fn unknown_frame_is_not_sent() {
        let (mut a, _b) = pair().await;

        let result = a.send(&TransferFrame::Unknown).await;
        assert!(matches!(result, Err(LinkError::Protocol(ProtocolError::UnknownKind))));
    }

    #[tokio::test]
    async fn connect_mode_dials_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (dialed, accepted) =
            tokio::join!(establish(LinkMode::Connect(addr.to_string())), listener.accept());

        let (_, peer) = dialed.unwrap();
        assert_eq!(peer, addr);
        assert!(accepted.is_ok());
    }
}
