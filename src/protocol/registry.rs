//! # Packet Registry
//!
//! Immutable, built-once bidirectional mapping between numeric packet ids and
//! packet types.
//!
//! Every sendable type implements [`Packet`] and carries its own wire id, so
//! the send path needs no reflective type lookup. The registry is still the
//! authority on what may cross a connection: sending an unregistered type
//! fails locally, and a received id without a registration is reported as a
//! peer mismatch.
//!
//! Registries are small, read-only after construction, and shared by
//! reference into every connection and listener, so lookups require no
//! locking.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ProtocolConfig;
use crate::core::serialization::{self, SerializationFormat};
use crate::error::{ProtocolError, Result};

/// Capability implemented by every packet type exchanged over a connection.
///
/// The associated `ID` is the type's wire identity; it must be unique within
/// one registry and agreed on by both peers.
///
/// ```
/// use packetwire::Packet;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Login { name: String }
///
/// impl Packet for Login {
///     const ID: u32 = 1;
/// }
/// ```
pub trait Packet: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Wire id of this packet type, unique within one registry.
    const ID: u32;
}

type DecodeFn =
    Box<dyn Fn(&[u8], SerializationFormat) -> Result<Box<dyn Any + Send>> + Send + Sync>;

struct Registration {
    id: u32,
    type_id: TypeId,
    type_name: &'static str,
    decode: DecodeFn,
}

/// A received packet with its dynamic type taken from the registry.
pub struct AnyPacket {
    id: u32,
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl AnyPacket {
    /// Wire id of the decoded packet.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Registered type name, as reported by `std::any::type_name`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the decoded packet is of type `T`.
    pub fn is<T: Packet>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Take the packet as a concrete `T`, or return `self` unchanged if the
    /// decoded type differs.
    pub fn downcast<T: Packet>(self) -> std::result::Result<T, Self> {
        let AnyPacket {
            id,
            type_name,
            value,
        } = self;
        match value.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(value) => Err(AnyPacket {
                id,
                type_name,
                value,
            }),
        }
    }

    /// Borrow the packet as a concrete `T`.
    pub fn downcast_ref<T: Packet>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for AnyPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyPacket")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Builder for [`PacketRegistry`].
///
/// Codec-configuration modifiers ([`format`](Self::format),
/// [`max_body_size`](Self::max_body_size)) apply to every registration;
/// [`build`](Self::build) rejects duplicate ids and duplicate types rather
/// than silently overwriting.
pub struct RegistryBuilder {
    entries: Vec<Registration>,
    config: ProtocolConfig,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            config: ProtocolConfig::default(),
        }
    }

    /// Register packet type `T` under its own `T::ID`.
    pub fn register<T: Packet>(mut self) -> Self {
        self.entries.push(Registration {
            id: T::ID,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            decode: Box::new(|bytes, format| {
                let value: T = serialization::decode(bytes, format)?;
                Ok(Box::new(value) as Box<dyn Any + Send>)
            }),
        });
        self
    }

    /// Set the body serialization format. Both peers must agree on it.
    pub fn format(mut self, format: SerializationFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the maximum allowed body size in bytes.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.config.max_body_size = bytes;
        self
    }

    /// Build the immutable registry, rejecting duplicate ids or types.
    pub fn build(self) -> Result<PacketRegistry> {
        self.config.validate_strict()?;

        let mut by_id = HashMap::with_capacity(self.entries.len());
        let mut by_type = HashMap::with_capacity(self.entries.len());

        for (index, entry) in self.entries.iter().enumerate() {
            if by_type.insert(entry.type_id, index).is_some() {
                return Err(ProtocolError::DuplicateType(entry.type_name));
            }
            if by_id.insert(entry.id, index).is_some() {
                return Err(ProtocolError::DuplicateId(entry.id));
            }
        }

        Ok(PacketRegistry {
            entries: self.entries,
            by_id,
            by_type,
            config: self.config,
        })
    }
}

/// Immutable id ↔ type mapping plus codec configuration, shared read-only by
/// every connection and listener built from it.
pub struct PacketRegistry {
    entries: Vec<Registration>,
    by_id: HashMap<u32, usize>,
    by_type: HashMap<TypeId, usize>,
    config: ProtocolConfig,
}

impl PacketRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Number of registered packet types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether type `T` is registered.
    pub fn contains<T: Packet>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Wire id for type `T`, if registered.
    pub fn id_of<T: Packet>(&self) -> Option<u32> {
        self.by_type
            .get(&TypeId::of::<T>())
            .map(|&index| self.entries[index].id)
    }

    pub(crate) fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Encode an outgoing value, returning its wire id and body bytes.
    pub(crate) fn encode_packet<T: Packet>(&self, value: &T) -> Result<(u32, Vec<u8>)> {
        let index = self
            .by_type
            .get(&TypeId::of::<T>())
            .ok_or_else(|| ProtocolError::UnregisteredType(std::any::type_name::<T>()))?;
        let body = serialization::encode(value, self.config.format)?;
        Ok((self.entries[*index].id, body))
    }

    /// Decode a received body by wire id.
    pub(crate) fn decode_packet(&self, id: u32, body: &[u8]) -> Result<AnyPacket> {
        let index = self
            .by_id
            .get(&id)
            .ok_or(ProtocolError::UnknownPacketId(id))?;
        let entry = &self.entries[*index];
        let value = (entry.decode)(body, self.config.format)?;
        Ok(AnyPacket {
            id,
            type_name: entry.type_name,
            value,
        })
    }
}

impl fmt::Debug for PacketRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketRegistry")
            .field("len", &self.entries.len())
            .field("config", &self.config)
            .finish()
    }
}
