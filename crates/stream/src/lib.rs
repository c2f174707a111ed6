#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `stream` writes and reads a single top-level Compaqt container whose
//! size is not known in advance and may exceed memory. The file starts
//! with a fixed-width streaming header (the Mode-3/8 masked container tag
//! plus an 8-byte little-endian item count) that [`StreamEncoder`]
//! rewrites in place after every write, so the file is a valid regular
//! encoding of the container at any point between calls.
//!
//! # Design
//!
//! Sessions hold no open file handle between calls: every `write` appends
//! through a fixed-size chunk and then patches the count; every `read`
//! seeks to the session's current offset and decodes through a refilling
//! chunk window. The chunk allocation is cached on the session and can be
//! released with the `clear_memory` flag or resized with a per-call
//! `chunk_size` override.
//!
//! # Invariants
//!
//! - After every successful [`StreamEncoder::write`], the file parses as
//!   a regular encoding whose item count equals the items ingested so far.
//! - Nested containers inside streamed items use minimal headers; only
//!   the outer header is forced wide.
//! - A single value never exceeds the chunk size, in either direction.
//!
//! # Errors
//!
//! [`StreamError`] wraps the codec errors and adds the session-specific
//! failures: a value of the wrong container kind, a file whose header
//! does not match the streaming signature, and file positioning problems.
//!
//! # Examples
//!
//! ```no_run
//! use engine::Value;
//! use stream::{ContainerKind, EncoderOptions, StreamDecoder, StreamEncoder};
//!
//! let mut encoder = StreamEncoder::open(
//!     "items.cpqt",
//!     ContainerKind::List,
//!     &EncoderOptions::default(),
//! )?;
//! encoder.write(&Value::List(vec![Value::Int(1)]))?;
//! encoder.write(&Value::List(vec![Value::Int(2)]))?;
//! encoder.finalize();
//!
//! let mut decoder = StreamDecoder::open("items.cpqt", &stream::DecoderOptions::default())?;
//! assert_eq!(decoder.items_remaining(), 2);
//! let all = decoder.read()?;
//! # Ok::<(), stream::StreamError>(())
//! ```

use std::sync::Arc;

use engine::{UserTypeDecoders, UserTypeEncoders};

mod decoder;
mod encoder;
mod error;

pub use decoder::StreamDecoder;
pub use encoder::StreamEncoder;
pub use error::{StreamError, StreamResult};
pub use wire::DEFAULT_CHUNK_SIZE;

/// The container kind of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// An ordered sequence; items are counted one by one.
    List,
    /// An ordered mapping; items are counted in pairs.
    Map,
}

impl ContainerKind {
    /// The wire tag of the container.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::List => wire::tag::ARRAY,
            Self::Map => wire::tag::DICTN,
        }
    }

    /// The kind for a wire tag, if it names a container.
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            wire::tag::ARRAY => Some(Self::List),
            wire::tag::DICTN => Some(Self::Map),
            _ => None,
        }
    }
}

/// Options of [`StreamEncoder::open`].
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Size of the in-memory chunk the encoder fills before flushing.
    pub chunk_size: usize,
    /// Continue a previous session: verify the streaming header at
    /// `file_offset`, adopt its kind and item count, and append.
    pub resume_stream: bool,
    /// Offset of the streaming header inside the file.
    pub file_offset: u64,
    /// Keep existing file contents and start the stream at end of file.
    pub preserve_file: bool,
    /// Usertype encoders for custom values inside streamed items.
    pub custom_types: Option<Arc<UserTypeEncoders>>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            resume_stream: false,
            file_offset: 0,
            preserve_file: false,
            custom_types: None,
        }
    }
}

/// Options of [`StreamDecoder::open`].
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// Size of the in-memory chunk the decoder reads through.
    pub chunk_size: usize,
    /// Offset of the streaming header inside the file.
    pub file_offset: u64,
    /// Usertype decoders for usertype frames inside streamed items.
    pub custom_types: Option<Arc<UserTypeDecoders>>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            file_offset: 0,
            custom_types: None,
        }
    }
}
