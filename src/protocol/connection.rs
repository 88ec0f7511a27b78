//! # Connection
//!
//! Owns one duplex stream's read and write sides and serializes concurrent
//! packet traffic over them.
//!
//! The two directions are guarded by independent `tokio::sync::Mutex`es, so a
//! blocked reader never prevents a sender from proceeding and frames from
//! concurrent callers are never interleaved byte-for-byte. Lock acquisition is
//! FIFO, which fixes the on-wire order for senders and the delivery order for
//! readers.
//!
//! A connection has exactly two states, open and closed, and the transition is
//! one-way: an explicit [`close`](Connection::close) or a fatal transport
//! error cancels the shared token and drops the stream halves, so every
//! blocked or future local operation observes
//! [`ProtocolError::ConnectionClosed`] instead of hanging, and the remote peer
//! observes end-of-stream.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::codec::{Frame, FrameCodec};
use crate::error::{ProtocolError, Result};
use crate::protocol::registry::{AnyPacket, Packet, PacketRegistry};

/// A full-duplex packet connection over any async byte stream.
///
/// The stream halves live inside the per-direction locks as `Option`s: a
/// closed connection holds `None`, which is what actually releases the
/// underlying stream.
pub struct Connection<S> {
    reader: Mutex<Option<FramedRead<ReadHalf<S>, FrameCodec>>>,
    writer: Mutex<Option<FramedWrite<WriteHalf<S>, FrameCodec>>>,
    registry: Arc<PacketRegistry>,
    shutdown: CancellationToken,
}

/// Errors that end the connection, as opposed to per-packet failures the
/// caller can recover from.
fn is_fatal(err: &ProtocolError) -> bool {
    matches!(
        err,
        ProtocolError::Io(_) | ProtocolError::ConnectionClosed | ProtocolError::DeserializeError(_)
    )
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send,
{
    /// Bind a registry to an already-open stream. Framing starts immediately;
    /// there is no handshake phase.
    pub fn new(stream: S, registry: Arc<PacketRegistry>) -> Self {
        let max_body_size = registry.config().max_body_size;
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: Mutex::new(Some(FramedRead::new(
                read_half,
                FrameCodec::new(max_body_size),
            ))),
            writer: Mutex::new(Some(FramedWrite::new(
                write_half,
                FrameCodec::new(max_body_size),
            ))),
            registry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Send one packet, holding the send lock for encode + write + flush.
    ///
    /// Fails with [`ProtocolError::UnregisteredType`] if `T` has no registry
    /// entry, before the lock is touched. Transport failures close the
    /// connection.
    pub async fn send<T: Packet>(&self, value: &T) -> Result<()> {
        let (packet_id, body) = self.registry.encode_packet(value)?;
        let frame = Frame::new(packet_id, body.into());

        // Biased so a closed connection always reports closed, even when the
        // lock or the sink is also ready.
        let mut writer = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(ProtocolError::ConnectionClosed),
            guard = self.writer.lock() => guard,
        };
        let framed = match writer.as_mut() {
            Some(framed) => framed,
            None => return Err(ProtocolError::ConnectionClosed),
        };

        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ProtocolError::ConnectionClosed),
            result = framed.send(frame) => result,
        };

        match result {
            Ok(()) => {
                drop(writer);
                trace!(packet_id, "frame written");
                Ok(())
            }
            Err(err) => {
                if is_fatal(&err) {
                    // We hold the write half; close() cannot take it, so
                    // release it here before tearing the rest down.
                    *writer = None;
                    drop(writer);
                    self.teardown();
                }
                Err(err)
            }
        }
    }

    /// Receive one packet, holding the receive lock for one full frame read.
    ///
    /// Returns the decoded value with its dynamic type taken from the
    /// registry. An unknown packet id yields
    /// [`ProtocolError::UnknownPacketId`] after the frame body has been fully
    /// consumed, so the stream remains framing-consistent and later calls
    /// still report transport state truthfully.
    pub async fn recv(&self) -> Result<AnyPacket> {
        let mut reader = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(ProtocolError::ConnectionClosed),
            guard = self.reader.lock() => guard,
        };
        let framed = match reader.as_mut() {
            Some(framed) => framed,
            None => return Err(ProtocolError::ConnectionClosed),
        };

        let next = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Some(Err(ProtocolError::ConnectionClosed)),
            next = framed.next() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => {
                drop(reader);
                frame
            }
            Some(Err(err)) => {
                if is_fatal(&err) {
                    *reader = None;
                    drop(reader);
                    self.teardown();
                }
                return Err(err);
            }
            None => {
                // Clean EOF from the peer.
                *reader = None;
                drop(reader);
                self.teardown();
                return Err(ProtocolError::ConnectionClosed);
            }
        };

        trace!(packet_id = frame.packet_id, body_len = frame.body.len(), "frame read");
        self.registry.decode_packet(frame.packet_id, &frame.body)
    }

    /// Close the connection and release the underlying stream, so the remote
    /// peer observes end-of-stream. Idempotent; any local operation blocked on
    /// either direction observes [`ProtocolError::ConnectionClosed`].
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            debug!("closing connection");
            self.teardown();
        }
    }

    /// Cancel the token and drop whichever stream halves are not currently
    /// held by an in-flight operation. A lock holder that observes the
    /// cancellation drops its own half, so both halves are gone once every
    /// in-flight operation has returned.
    fn teardown(&self) {
        self.shutdown.cancel();
        if let Ok(mut writer) = self.writer.try_lock() {
            *writer = None;
        }
        if let Ok(mut reader) = self.reader.try_lock() {
            *reader = None;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// The registry this connection was built with.
    pub fn registry(&self) -> &Arc<PacketRegistry> {
        &self.registry
    }
}

impl<S> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.shutdown.is_cancelled())
            .finish()
    }
}
