//! # Transport Adapters
//!
//! Raw-socket adapters that stamp out [`Connection`](crate::Connection)s
//! sharing one registry/codec configuration. Purely factories — no framing
//! happens here.

pub mod tcp;
