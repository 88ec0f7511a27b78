//! # packetwire
//!
//! Typed, length-prefixed packet framing multiplexed over a single duplex
//! byte stream.
//!
//! Two peers exchange strongly-typed messages ("packets") identified by a
//! small numeric id. Each packet is serialized independently; the only thing
//! the peers share up front is an id → type registry.
//!
//! ## Wire Format
//! ```text
//! [HeaderLen(1)] [Header(HeaderLen)] [Body(N)]
//! ```
//! The header carries the packet id and exact body length, encoded with a
//! fixed schema; its encoded form must fit the single length byte (0-255).
//!
//! ## Components
//! - **[`Packet`]**: capability trait each message type implements, carrying
//!   its own wire id
//! - **[`PacketRegistry`]**: immutable id ↔ type mapping shared by reference
//!   into every connection
//! - **[`Connection`]**: full-duplex send/recv over one stream, one FIFO lock
//!   per direction
//! - **[`PacketListener`]**: accepts raw TCP connections and stamps out
//!   connections sharing one registry
//!
//! ## Example
//! ```no_run
//! use packetwire::{connect, Packet, PacketRegistry};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Chat { text: String }
//!
//! impl Packet for Chat {
//!     const ID: u32 = 1;
//! }
//!
//! #[tokio::main]
//! async fn main() -> packetwire::Result<()> {
//!     let registry = Arc::new(PacketRegistry::builder().register::<Chat>().build()?);
//!     let conn = connect("127.0.0.1:9000", registry).await?;
//!
//!     conn.send(&Chat { text: "hello".into() }).await?;
//!     let reply = conn.recv().await?.downcast::<Chat>().ok();
//!     println!("{reply:?}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;

pub use self::core::serialization::SerializationFormat;
pub use error::{ProtocolError, Result};
pub use protocol::connection::Connection;
pub use protocol::registry::{AnyPacket, Packet, PacketRegistry, RegistryBuilder};
pub use transport::tcp::{connect, PacketListener};
