#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compaqt` is a compact, self-describing binary serialization format
//! for dynamic values: strings, byte strings, signed integers up to 64
//! bits, doubles, booleans, null, ordered lists, ordered maps, and a
//! 32-slot user-extensible type space. The crate bundles four engines
//! over one bit-exact wire format:
//!
//! - a one-shot encoder/decoder ([`encode`], [`decode`]) over bytes or
//!   whole files, with an optional zero-copy decode mode,
//! - a file-backed streaming encoder/decoder ([`StreamEncoder`],
//!   [`StreamDecoder`]) for containers larger than memory,
//! - a structural [`validate`]r that checks conformance without building
//!   values,
//! - the usertype registries ([`UserTypeEncoders`], [`UserTypeDecoders`])
//!   that extend the palette with caller-defined types.
//!
//! # Design
//!
//! Every value is one self-describing frame: a head byte carrying the
//! type tag and a length mode, followed by the payload. Variable-length
//! types use the shortest of three length encodings; a container created
//! by a streaming session instead reserves a fixed 9-byte header whose
//! item count is patched in place as items are appended, which is the
//! format's only non-minimal encoding. All scalars are little-endian.
//!
//! A file produced by a finished streaming session is indistinguishable
//! from a one-shot encode of the same container with `stream_compatible`
//! set, and either decoder reads it.
//!
//! # Examples
//!
//! Round-trip a value and check it validates:
//!
//! ```
//! use compaqt::{decode, encode, validate, Value};
//!
//! let value = Value::Map(vec![
//!     (Value::from("name"), Value::from("garden")),
//!     (Value::from("plots"), Value::List(vec![Value::Int(3), Value::Int(5)])),
//! ]);
//!
//! let bytes = encode(&value)?;
//! assert!(validate(&bytes));
//! assert_eq!(decode(bytes)?, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Stream a growing list into a file, then read it back in slices:
//!
//! ```no_run
//! use compaqt::{ContainerKind, EncoderOptions, DecoderOptions, StreamDecoder, StreamEncoder, Value};
//!
//! let mut encoder = StreamEncoder::open(
//!     "telemetry.cpqt",
//!     ContainerKind::List,
//!     &EncoderOptions::default(),
//! )?;
//! for sample in 0..1_000i64 {
//!     encoder.write(&Value::List(vec![Value::Int(sample)]))?;
//! }
//! encoder.finalize();
//!
//! let mut decoder = StreamDecoder::open("telemetry.cpqt", &DecoderOptions::default())?;
//! while decoder.items_remaining() > 0 {
//!     let slice = decoder.read_with(Some(100), false, None)?;
//!     // process the slice...
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # See also
//!
//! - [`manual_allocations`] / [`dynamic_allocations`] tune the adaptive
//!   sizing of encode buffers.
//! - [`DecodeOptions::referenced`] switches string and byte results to
//!   zero-copy views of the input buffer.

pub use engine::{
    decode, decode_file, decode_with, dynamic_allocations, encode, encode_with,
    manual_allocations, validate, validate_with, CustomDecoded, CustomEncoded, CustomValue,
    DecodeError, DecodeInput, DecodeOptions, DecodeResult, EncodeError, EncodeOptions,
    EncodeResult, InvalidAllocation, RawBytes, RegistryError, UserTypeDecoders, UserTypeEncoders,
    Utf8Bytes, ValidateError, ValidateInput, ValidateOptions, Value, MAX_USER_TYPES,
};
pub use stream::{
    ContainerKind, DecoderOptions, EncoderOptions, StreamDecoder, StreamEncoder, StreamError,
    StreamResult, DEFAULT_CHUNK_SIZE,
};
