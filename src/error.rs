//! # Error Types
//!
//! Comprehensive error handling for the packet protocol.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O failures to registry misconfiguration.
//!
//! ## Error Categories
//! - **Transport**: stream read/write/flush failures, including short reads.
//!   Always fatal to the connection that observed them.
//! - **Registration**: the caller tried to send a type the registry does not
//!   know. A local precondition failure, surfaced immediately to the sender.
//! - **Unknown packet**: a received frame carries an id absent from the
//!   registry, which indicates a version or registry mismatch between peers.
//! - **Wire limits**: encoded headers above the one-byte length ceiling and
//!   bodies above the configured maximum size.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

/// Primary error type for all protocol operations.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Deserialize error: {0}")]
    DeserializeError(String),

    /// Send-side precondition failure: the value's type has no registry entry.
    #[error("No registration for outgoing packet type `{0}`")]
    UnregisteredType(&'static str),

    /// Receive-side mismatch: the frame's id has no registry entry. The frame
    /// body was already consumed, so the stream itself stays framing-consistent.
    #[error("Received frame with unknown packet id {0}")]
    UnknownPacketId(u32),

    /// The encoded frame header exceeds the single-byte length prefix. This is
    /// a protocol-construction mistake, never a runtime transport condition.
    #[error("Encoded frame header is {0} bytes, limit is 255")]
    HeaderTooLarge(usize),

    #[error("Packet body too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Duplicate packet id {0} in registry")]
    DuplicateId(u32),

    #[error("Packet type `{0}` registered more than once")]
    DuplicateType(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
