#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` turns host values into Compaqt frames and back. It owns the
//! [`Value`] model, the recursive encoder and decoder built on the `wire`
//! crate's frame primitives, the adaptive allocation governor that sizes
//! encode buffers, the usertype registries, the one-shot `encode`/`decode`
//! drivers, and the structural validator.
//!
//! # Design
//!
//! - [`value`] defines [`Value`] together with the [`Utf8Bytes`] and
//!   [`RawBytes`] view types whose backing storage can be shared with a
//!   decode input (zero-copy, or "referenced", decoding).
//! - [`encode`] and [`decode`] hold the recursive codec; both are written
//!   against the `wire` sink/source traits so the one-shot and streaming
//!   paths share one implementation.
//! - [`alloc`] is the process-wide allocation governor: running estimates
//!   of bytes-per-item and realloc slack that bias the initial buffer size
//!   of container encodes toward recently observed densities.
//! - [`usertypes`] maps host types to the 32 usertype wire slots.
//! - [`driver`] is the public one-shot surface: bytes or file in, bytes or
//!   file out, with `stream_compatible` and `referenced` options.
//! - [`validate`] recognizes the frame grammar without materializing
//!   values, over bytes or a chunked file window.
//!
//! # Invariants
//!
//! - `decode(encode(v))` is structurally equal to `v` for every supported
//!   value, and list/map order is preserved.
//! - The encoder emits the shortest head for every frame unless a
//!   streaming-compatible container header is requested.
//! - Referenced decoding never copies string or byte payloads; the views
//!   keep the input buffer alive instead.
//! - The governor is only updated by encodes that succeed.
//!
//! # Errors
//!
//! [`EncodeError`] and [`DecodeError`] wrap the wire-level errors and add
//! the host-side failures (unsupported types, invalid UTF-8, unknown
//! usertype indexes, failing user codecs). [`ValidateError`] covers the
//! validator's raising mode and its file I/O.
//!
//! # Examples
//!
//! ```
//! use engine::{decode, encode, Value};
//!
//! let value = Value::List(vec![Value::Int(1), Value::from("two")]);
//! let bytes = encode(&value).unwrap();
//! assert_eq!(decode(bytes).unwrap(), value);
//! ```

pub mod alloc;
pub mod decode;
pub mod driver;
pub mod encode;
pub mod usertypes;
pub mod validate;
pub mod value;

mod error;

pub use alloc::{dynamic_allocations, manual_allocations, InvalidAllocation};
pub use driver::{
    decode, decode_file, decode_with, encode, encode_with, DecodeInput, DecodeOptions,
    EncodeOptions,
};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult, ValidateError};
pub use usertypes::{
    CustomDecoded, CustomEncoded, RegistryError, UserTypeDecoders, UserTypeEncoders,
    MAX_USER_TYPES,
};
pub use validate::{validate, validate_with, ValidateInput, ValidateOptions};
pub use value::{CustomValue, RawBytes, Utf8Bytes, Value};
