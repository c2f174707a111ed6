//! The host value model.
//!
//! [`Value`] is the palette of kinds the wire format can carry. String and
//! byte payloads live behind the [`Utf8Bytes`] and [`RawBytes`] view types,
//! whose backing storage is a refcounted [`Bytes`] handle: a referenced
//! decode hands out slices of the input buffer, so the views extend the
//! buffer's lifetime instead of copying it. Maps are vectors of pairs to
//! preserve insertion order exactly.

use std::any::{Any, TypeId};
use std::fmt;
use std::ops::Deref;
use std::str::{self, Utf8Error};
use std::sync::Arc;

use bytes::Bytes;

use crate::error::EncodeError;

/// A dynamic value in the Compaqt palette.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The null value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer, at most 8 bytes on the wire.
    Int(i64),
    /// An IEEE-754 double.
    Float(f64),
    /// A UTF-8 string.
    Str(Utf8Bytes),
    /// A raw byte string.
    Bytes(RawBytes),
    /// An ordered sequence.
    List(Vec<Value>),
    /// An ordered key/value mapping; pairs keep their insertion order.
    Map(Vec<(Value, Value)>),
    /// A user-extended value, encoded through the usertype registries.
    Custom(CustomValue),
}

impl Value {
    /// Short name of the value's kind, as used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Custom(custom) => custom.type_name(),
        }
    }

    /// Whether this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The double, if this is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// The byte contents, if this is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// The items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The pairs, if this is a map.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(pairs) => Some(pairs),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Utf8Bytes::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Utf8Bytes::from(v))
    }
}

impl From<Utf8Bytes> for Value {
    fn from(v: Utf8Bytes) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(RawBytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(RawBytes::from(v))
    }
}

impl From<RawBytes> for Value {
    fn from(v: RawBytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<(Value, Value)>> for Value {
    fn from(v: Vec<(Value, Value)>) -> Self {
        Self::Map(v)
    }
}

impl TryFrom<i128> for Value {
    type Error = EncodeError;

    /// Fails with [`EncodeError::IntegerTooWide`] outside the `i64` range,
    /// the widest integer the wire format carries.
    fn try_from(v: i128) -> Result<Self, Self::Error> {
        i64::try_from(v)
            .map(Self::Int)
            .map_err(|_| EncodeError::IntegerTooWide)
    }
}

impl TryFrom<u64> for Value {
    type Error = EncodeError;

    /// Fails with [`EncodeError::IntegerTooWide`] above `i64::MAX`.
    fn try_from(v: u64) -> Result<Self, Self::Error> {
        i64::try_from(v)
            .map(Self::Int)
            .map_err(|_| EncodeError::IntegerTooWide)
    }
}

/// A validated UTF-8 string over refcounted bytes.
///
/// Cloning is cheap; when produced by a referenced decode, the view shares
/// the decode input's backing storage and keeps it alive.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Utf8Bytes {
    bytes: Bytes,
}

impl Utf8Bytes {
    /// Wraps `bytes`, validating that they are UTF-8.
    pub fn from_utf8(bytes: Bytes) -> Result<Self, Utf8Error> {
        str::from_utf8(&bytes)?;
        Ok(Self { bytes })
    }

    /// The string contents.
    pub fn as_str(&self) -> &str {
        // Validated at construction; every constructor checks.
        str::from_utf8(&self.bytes).expect("Utf8Bytes holds valid UTF-8")
    }

    /// The raw UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes, not codepoints.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the string is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the view and returns the backing handle.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<&str> for Utf8Bytes {
    fn from(v: &str) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(v.as_bytes()),
        }
    }
}

impl From<String> for Utf8Bytes {
    fn from(v: String) -> Self {
        Self {
            bytes: Bytes::from(v.into_bytes()),
        }
    }
}

impl Deref for Utf8Bytes {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Utf8Bytes {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Utf8Bytes {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Utf8Bytes {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Debug for Utf8Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Utf8Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A byte string over refcounted bytes.
///
/// Like [`Utf8Bytes`], cloning is cheap and referenced decodes share the
/// input buffer's storage.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct RawBytes {
    bytes: Bytes,
}

impl RawBytes {
    /// The byte contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the byte string is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes the view and returns the backing handle.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(v: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(v),
        }
    }
}

impl From<&[u8]> for RawBytes {
    fn from(v: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(v),
        }
    }
}

impl From<Bytes> for RawBytes {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl Deref for RawBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for RawBytes {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq<[u8]> for RawBytes {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl fmt::Debug for RawBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawBytes({} bytes)", self.bytes.len())
    }
}

/// A user-extended value carried opaquely through the codec.
///
/// The wrapped value is type-erased; the usertype encode registry finds
/// its encoder by the erased type's identity. Equality is handle identity,
/// since the codec cannot compare arbitrary host types.
#[derive(Clone)]
pub struct CustomValue {
    inner: Arc<dyn Any + Send + Sync>,
    name: &'static str,
}

impl CustomValue {
    /// Wraps a host value for usertype encoding.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            name: std::any::type_name::<T>(),
        }
    }

    /// The wrapped value, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Identity of the wrapped type, the usertype registry key.
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Name of the wrapped type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomValue({})", self.name)
    }
}
