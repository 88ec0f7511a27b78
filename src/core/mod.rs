//! # Core Protocol Components
//!
//! Low-level frame handling and binary serialization.
//!
//! This module provides the foundation for the protocol: the wire frame
//! format and the serialization formats used for packet bodies.
//!
//! ## Components
//! - **Codec**: Tokio codec for framing packets over byte streams
//! - **Serialization**: body encoding formats (bincode, JSON, MessagePack)
//!
//! ## Wire Format
//! ```text
//! [HeaderLen(1)] [Header(HeaderLen)] [Body(N)]
//! ```
//! where the header is a fixed bincode-encoded `{packet_id: u32, body_len: u64}`
//! and `N` equals the decoded `body_len`.
//!
//! ## Security
//! - Maximum body size enforced before allocation (prevents memory exhaustion)
//! - Header length capped at 255 bytes by the one-byte prefix

pub mod codec;
pub mod serialization;
