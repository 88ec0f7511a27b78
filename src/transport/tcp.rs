//! TCP listener adapter and client connector.
//!
//! [`PacketListener`] accepts raw TCP connections and wraps each as a
//! [`Connection`] sharing one registry; [`connect`] does the same for the
//! client side. Framing starts immediately on the accepted stream — the
//! protocol has no handshake phase.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{ProtocolError, Result};
use crate::protocol::connection::Connection;
use crate::protocol::registry::PacketRegistry;

/// Accepts raw TCP connections and wraps each in a [`Connection`] with the
/// shared registry.
///
/// The socket lives inside the accept lock as an `Option`; closing the
/// listener drops it, which is what actually releases the port.
pub struct PacketListener {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    registry: Arc<PacketRegistry>,
    shutdown: CancellationToken,
}

impl PacketListener {
    /// Bind a listening socket on `addr`.
    #[instrument(skip(registry))]
    pub async fn bind(addr: &str, registry: Arc<PacketRegistry>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, packet_types = registry.len(), "listening");
        Ok(Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            registry,
            shutdown: CancellationToken::new(),
        })
    }

    /// Local address the listener was bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until a new connection arrives and wrap it with the shared
    /// registry. A pending accept fails with
    /// [`ProtocolError::ConnectionClosed`] once the listener is closed.
    pub async fn accept(&self) -> Result<(Connection<TcpStream>, SocketAddr)> {
        let mut listener = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(ProtocolError::ConnectionClosed),
            guard = self.listener.lock() => guard,
        };
        let socket = match listener.as_ref() {
            Some(socket) => socket,
            None => return Err(ProtocolError::ConnectionClosed),
        };

        let accepted = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(ProtocolError::ConnectionClosed),
            accepted = socket.accept() => accepted.map_err(ProtocolError::from),
        };

        match accepted {
            Ok((stream, peer)) => {
                drop(listener);
                debug!(%peer, "accepted connection");
                Ok((Connection::new(stream, self.registry.clone()), peer))
            }
            Err(err) => {
                if matches!(err, ProtocolError::ConnectionClosed) {
                    // We hold the socket; close() could not take it, so
                    // release it here.
                    *listener = None;
                }
                Err(err)
            }
        }
    }

    /// Close the listener and release the listening socket. Idempotent; a
    /// socket held by an in-flight accept is released by that accept when it
    /// observes the cancellation.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            self.shutdown.cancel();
            if let Ok(mut listener) = self.listener.try_lock() {
                *listener = None;
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Connect to a remote listener and bind the registry to the new stream.
#[instrument(skip(registry))]
pub async fn connect(addr: &str, registry: Arc<PacketRegistry>) -> Result<Connection<TcpStream>> {
    let stream = TcpStream::connect(addr).await?;
    debug!(%addr, "connected");
    Ok(Connection::new(stream, registry))
}
