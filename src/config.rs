//! # Protocol Configuration
//!
//! Wire-format constants and the per-registry protocol configuration.
//!
//! The configuration surface of this core is intentionally small: a body
//! serialization format and a maximum body size, both applied when a registry
//! is built and shared read-only by every connection stamped from it. There is
//! no file or environment surface.

use crate::core::serialization::SerializationFormat;
use crate::error::{ProtocolError, Result};

/// Hard ceiling on the encoded frame header: its length travels as one byte.
pub const MAX_ENCODED_HEADER: usize = 255;

/// Default maximum allowed body size (16 MB), validated before allocation on
/// the receive path so a hostile length claim cannot exhaust memory.
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Codec configuration shared by all connections built from one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Serialization format used for packet bodies. Frame headers always use
    /// the fixed bincode schema regardless of this setting.
    pub format: SerializationFormat,

    /// Maximum allowed packet body size in bytes, enforced on both paths.
    pub max_body_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            format: SerializationFormat::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ProtocolConfig {
    /// Validate the configuration for common misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means the
    /// configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        } else if self.max_body_size > 100 * 1024 * 1024 {
            errors.push(format!(
                "Max body size too large: {} bytes (maximum recommended: 100 MB)",
                self.max_body_size
            ));
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}
