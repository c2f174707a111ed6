//! Usertype registries: host types mapped onto the 32 usertype wire slots.
//!
//! The encode side is keyed by the erased type identity of the wrapped
//! host value; the decode side is a sparse 32-slot table indexed by the
//! wire index. Registries are immutable once handed to a codec and are
//! cheap to clone, so one registry can serve any number of sessions.

use std::any::TypeId;
use std::error::Error;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error as ThisError;

use crate::value::{CustomValue, Value};

/// Highest number of usertype slots the wire format addresses: the index
/// shares the head byte with the 3-bit tag, leaving 5 bits.
pub const MAX_USER_TYPES: usize = 32;

/// What a usertype encoder returns: the opaque payload bytes.
pub type CustomEncoded = Result<Vec<u8>, Box<dyn Error + Send + Sync>>;

/// What a usertype decoder returns: the reconstructed value.
pub type CustomDecoded = Result<Value, Box<dyn Error + Send + Sync>>;

type EncodeFn = Arc<dyn Fn(&CustomValue) -> CustomEncoded + Send + Sync>;
type DecodeFn = Arc<dyn Fn(&[u8]) -> CustomDecoded + Send + Sync>;

/// Errors raised while building a registry.
#[derive(Debug, ThisError)]
pub enum RegistryError {
    /// The registry is at its 32-entry capacity.
    #[error("only up to 32 custom types are allowed")]
    TooMany,
    /// The wire index does not fit the 5-bit field.
    #[error("custom type index out of range: got {0}, max is 31")]
    IndexOutOfRange(u8),
    /// The wire index already has a decoder.
    #[error("custom type index {0} already has a decoder")]
    DuplicateIndex(u8),
    /// The host type already has an encoder.
    #[error("host type is already registered")]
    DuplicateType,
}

/// Encoder registry: host type identity to `(wire index, encoder)`.
#[derive(Clone, Default)]
pub struct UserTypeEncoders {
    table: FxHashMap<TypeId, (u8, EncodeFn)>,
}

impl UserTypeEncoders {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `encode` for host type `T` on wire index `idx`.
    pub fn register<T, F>(&mut self, idx: u8, encode: F) -> Result<(), RegistryError>
    where
        T: std::any::Any + Send + Sync,
        F: Fn(&T) -> CustomEncoded + Send + Sync + 'static,
    {
        if usize::from(idx) >= MAX_USER_TYPES {
            return Err(RegistryError::IndexOutOfRange(idx));
        }
        if self.table.len() >= MAX_USER_TYPES {
            return Err(RegistryError::TooMany);
        }
        let key = TypeId::of::<T>();
        if self.table.contains_key(&key) {
            return Err(RegistryError::DuplicateType);
        }

        let erased: EncodeFn = Arc::new(move |value: &CustomValue| match value.downcast_ref::<T>()
        {
            Some(concrete) => encode(concrete),
            None => Err("usertype encoder received a mismatched value".into()),
        });
        self.table.insert(key, (idx, erased));
        Ok(())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Runs the encoder registered for `value`'s type, if any, returning
    /// the wire index and the produced payload.
    pub(crate) fn encode_for(&self, value: &CustomValue) -> Option<(u8, CustomEncoded)> {
        let (idx, func) = self.table.get(&value.type_id())?;
        Some((*idx, func.as_ref()(value)))
    }
}

impl std::fmt::Debug for UserTypeEncoders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserTypeEncoders({} types)", self.table.len())
    }
}

/// Decoder registry: a sparse 32-slot table indexed by the wire index.
#[derive(Clone)]
pub struct UserTypeDecoders {
    slots: [Option<DecodeFn>; MAX_USER_TYPES],
}

impl UserTypeDecoders {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `decode` on wire index `idx`.
    pub fn register<F>(&mut self, idx: u8, decode: F) -> Result<(), RegistryError>
    where
        F: Fn(&[u8]) -> CustomDecoded + Send + Sync + 'static,
    {
        let slot = self
            .slots
            .get_mut(usize::from(idx))
            .ok_or(RegistryError::IndexOutOfRange(idx))?;
        if slot.is_some() {
            return Err(RegistryError::DuplicateIndex(idx));
        }
        *slot = Some(Arc::new(decode));
        Ok(())
    }

    /// Runs the decoder in slot `idx` over `payload`, if one is registered.
    pub(crate) fn decode_at(&self, idx: u8, payload: &[u8]) -> Option<CustomDecoded> {
        let func = self.slots.get(usize::from(idx))?.as_ref()?;
        Some(func.as_ref()(payload))
    }
}

impl Default for UserTypeDecoders {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl std::fmt::Debug for UserTypeDecoders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filled = self.slots.iter().filter(|slot| slot.is_some()).count();
        write!(f, "UserTypeDecoders({filled} slots)")
    }
}
