//! Property-based tests using proptest
//!
//! These validate wire-format invariants of the frame codec across randomly
//! generated inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::{Bytes, BytesMut};
use packetwire::config::DEFAULT_MAX_BODY_SIZE;
use packetwire::core::codec::{Frame, FrameCodec};
use proptest::prelude::*;
use tokio_util::codec::{Decoder, Encoder};

fn codec() -> FrameCodec {
    FrameCodec::new(DEFAULT_MAX_BODY_SIZE)
}

// Property: any (id, body) frame survives an encode/decode cycle.
proptest! {
    #[test]
    fn prop_frame_roundtrip(id in any::<u32>(), body in prop::collection::vec(any::<u8>(), 0..2048)) {
        let mut buf = BytesMut::new();
        codec().encode(Frame::new(id, Bytes::from(body.clone())), &mut buf).expect("encode");

        let frame = codec().decode(&mut buf).expect("decode").expect("complete frame");
        prop_assert_eq!(frame.packet_id, id);
        prop_assert_eq!(&frame.body[..], &body[..]);
        prop_assert!(buf.is_empty());
    }
}

// Property: frame encoding is deterministic.
proptest! {
    #[test]
    fn prop_frame_encoding_deterministic(id in any::<u32>(), body in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut buf1 = BytesMut::new();
        let mut buf2 = BytesMut::new();
        codec().encode(Frame::new(id, Bytes::from(body.clone())), &mut buf1).expect("encode");
        codec().encode(Frame::new(id, Bytes::from(body)), &mut buf2).expect("encode");

        prop_assert_eq!(buf1, buf2);
    }
}

// Property: the header length byte always describes the header exactly, and
// never exceeds the one-byte ceiling by construction.
proptest! {
    #[test]
    fn prop_header_length_byte_exact(id in any::<u32>(), body in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut buf = BytesMut::new();
        codec().encode(Frame::new(id, Bytes::from(body.clone())), &mut buf).expect("encode");

        let header_len = buf[0] as usize;
        prop_assert_eq!(buf.len(), 1 + header_len + body.len());
    }
}

// Property: splitting the encoded bytes at any point and feeding the codec in
// two chunks decodes the same frame (no partial frame is ever surfaced).
proptest! {
    #[test]
    fn prop_split_delivery_decodes_once(
        id in any::<u32>(),
        body in prop::collection::vec(any::<u8>(), 0..512),
        split_frac in 0.0f64..1.0
    ) {
        let mut full = BytesMut::new();
        codec().encode(Frame::new(id, Bytes::from(body.clone())), &mut full).expect("encode");

        let split = ((full.len() as f64) * split_frac) as usize;
        let split = split.min(full.len().saturating_sub(1));

        let mut c = codec();
        let mut buf = BytesMut::from(&full[..split]);
        prop_assert!(c.decode(&mut buf).expect("decode first chunk").is_none());

        buf.extend_from_slice(&full[split..]);
        let frame = c.decode(&mut buf).expect("decode second chunk").expect("complete frame");
        prop_assert_eq!(frame.packet_id, id);
        prop_assert_eq!(&frame.body[..], &body[..]);
    }
}

// Property: back-to-back frames decode in order with no bytes left over.
proptest! {
    #[test]
    fn prop_frame_sequence_preserved(bodies in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..128), 1..10)) {
        let mut buf = BytesMut::new();
        let mut c = codec();
        for (i, body) in bodies.iter().enumerate() {
            c.encode(Frame::new(i as u32, Bytes::from(body.clone())), &mut buf).expect("encode");
        }

        for (i, body) in bodies.iter().enumerate() {
            let frame = c.decode(&mut buf).expect("decode").expect("complete frame");
            prop_assert_eq!(frame.packet_id, i as u32);
            prop_assert_eq!(&frame.body[..], &body[..]);
        }
        prop_assert!(buf.is_empty());
    }
}
