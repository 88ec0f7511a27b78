//! # Protocol Layer
//!
//! The typed surface of the wire protocol: the packet registry that maps ids
//! to types and the connection object that moves packets over one stream.

pub mod connection;
pub mod registry;
