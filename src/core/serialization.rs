//! # Serialization Formats
//!
//! Abstraction over the serialization formats available for packet bodies.
//! Supports bincode (default), JSON (debugging/interop), and MessagePack
//! (compact encoding).
//!
//! The format is a registry-level setting: both peers must build their
//! registries with the same format, since nothing on the wire identifies it.
//! Frame headers are exempt — they always use the fixed bincode schema so that
//! framing never depends on body configuration.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ProtocolError, Result};

/// Supported body serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializationFormat {
    /// Binary compact format (default, fastest)
    #[default]
    Bincode,
    /// Human-readable JSON format (debugging, interop)
    Json,
    /// Compact binary format (MessagePack, efficient)
    MessagePack,
}

impl SerializationFormat {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            SerializationFormat::Bincode => "Bincode",
            SerializationFormat::Json => "JSON",
            SerializationFormat::MessagePack => "MessagePack",
        }
    }
}

/// Serialize a value to bytes using the specified format.
pub fn encode<T: Serialize>(value: &T, format: SerializationFormat) -> Result<Vec<u8>> {
    match format {
        SerializationFormat::Bincode => {
            bincode::serialize(value).map_err(|e| ProtocolError::SerializeError(e.to_string()))
        }
        SerializationFormat::Json => {
            serde_json::to_vec(value).map_err(|e| ProtocolError::SerializeError(e.to_string()))
        }
        SerializationFormat::MessagePack => {
            rmp_serde::to_vec(value).map_err(|e| ProtocolError::SerializeError(e.to_string()))
        }
    }
}

/// Deserialize a value from bytes using the specified format.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: SerializationFormat) -> Result<T> {
    match format {
        SerializationFormat::Bincode => {
            bincode::deserialize(data).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
        }
        SerializationFormat::Json => {
            serde_json::from_slice(data).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
        }
        SerializationFormat::MessagePack => {
            rmp_serde::from_slice(data).map_err(|e| ProtocolError::DeserializeError(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        text: String,
        count: u32,
    }

    fn sample() -> Sample {
        Sample {
            text: "hello".to_string(),
            count: 7,
        }
    }

    #[test]
    fn test_format_names() {
        assert_eq!(SerializationFormat::Bincode.name(), "Bincode");
        assert_eq!(SerializationFormat::Json.name(), "JSON");
        assert_eq!(SerializationFormat::MessagePack.name(), "MessagePack");
    }

    #[test]
    fn test_default_format() {
        assert_eq!(SerializationFormat::default(), SerializationFormat::Bincode);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_roundtrip_all_formats() {
        for format in [
            SerializationFormat::Bincode,
            SerializationFormat::Json,
            SerializationFormat::MessagePack,
        ] {
            let bytes = encode(&sample(), format).expect("serialize");
            let recovered: Sample = decode(&bytes, format).expect("deserialize");
            assert_eq!(recovered, sample());
        }
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_format_sizes() {
        let bincode_size = encode(&sample(), SerializationFormat::Bincode)
            .expect("bincode")
            .len();
        let json_size = encode(&sample(), SerializationFormat::Json)
            .expect("json")
            .len();
        let msgpack_size = encode(&sample(), SerializationFormat::MessagePack)
            .expect("msgpack")
            .len();

        println!("Bincode: {bincode_size} bytes");
        println!("JSON: {json_size} bytes");
        println!("MessagePack: {msgpack_size} bytes");

        // MessagePack should be more compact than JSON
        assert!(msgpack_size < json_size);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let garbage = [0xFFu8; 3];
        let result: Result<Sample> = decode(&garbage, SerializationFormat::Json);
        assert!(matches!(result, Err(ProtocolError::DeserializeError(_))));
    }
}
