//! # Frame Codec
//!
//! Tokio codec implementing the wire frame format.
//!
//! Each frame is one complete wire unit:
//! ```text
//! [HeaderLen(1)] [Header(HeaderLen)] [Body(body_len)]
//! ```
//!
//! The header is encoded with a fixed bincode schema shared by all
//! connections; its encoded length must fit the single length byte (0-255).
//! The body is opaque to this layer — the codec only measures it for framing
//! and never inspects its contents.
//!
//! Partial input is handled incrementally: `decode` returns `Ok(None)` until a
//! whole frame is buffered. A stream that ends mid-frame surfaces as an I/O
//! error from `decode_eof`, never as a shorter frame.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_ENCODED_HEADER;
use crate::error::{ProtocolError, Result};

/// Transient per-frame header. Exists only on the wire; encoded with the fixed
/// header schema regardless of the body serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Registry id of the packet type carried in the body.
    pub packet_id: u32,
    /// Exact encoded length of the body that follows.
    pub body_len: u64,
}

/// One complete wire unit: a packet id plus its encoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub packet_id: u32,
    pub body: Bytes,
}

impl Frame {
    pub fn new(packet_id: u32, body: Bytes) -> Self {
        Self { packet_id, body }
    }
}

/// Encoder/decoder for the frame wire format.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_body_size: usize,
}

impl FrameCodec {
    pub fn new(max_body_size: usize) -> Self {
        Self { max_body_size }
    }
}

fn encode_header<H: Serialize>(header: &H) -> Result<Vec<u8>> {
    let bytes = bincode::serialize(header)
        .map_err(|e| ProtocolError::SerializeError(e.to_string()))?;
    if bytes.len() > MAX_ENCODED_HEADER {
        return Err(ProtocolError::HeaderTooLarge(bytes.len()));
    }
    Ok(bytes)
}

fn decode_header(bytes: &[u8]) -> Result<FrameHeader> {
    bincode::deserialize(bytes).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        if frame.body.len() > self.max_body_size {
            return Err(ProtocolError::OversizedPacket(frame.body.len()));
        }

        let header = FrameHeader {
            packet_id: frame.packet_id,
            body_len: frame.body.len() as u64,
        };
        // Header ceiling is checked before a single byte reaches the buffer,
        // so a rejected frame leaves the stream in its prior state.
        let header_bytes = encode_header(&header)?;

        dst.reserve(1 + header_bytes.len() + frame.body.len());
        dst.put_u8(header_bytes.len() as u8);
        dst.put_slice(&header_bytes);
        dst.put_slice(&frame.body);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.is_empty() {
            return Ok(None);
        }

        let header_len = src[0] as usize;
        if src.len() < 1 + header_len {
            src.reserve(1 + header_len - src.len());
            return Ok(None);
        }

        let header = decode_header(&src[1..1 + header_len])?;
        let body_len = header.body_len as usize;

        // Validate the claimed length before buffering the body.
        if body_len > self.max_body_size {
            return Err(ProtocolError::OversizedPacket(body_len));
        }

        if src.len() < 1 + header_len + body_len {
            src.reserve(1 + header_len + body_len - src.len());
            return Ok(None);
        }

        src.advance(1 + header_len);
        let body = src.split_to(body_len).freeze();
        Ok(Some(Frame::new(header.packet_id, body)))
    }
}
