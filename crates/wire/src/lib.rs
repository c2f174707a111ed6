#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `wire` holds the byte-level primitives of the Compaqt serialization
//! format: the type-tag constants, the frame-head codec with its three
//! length modes, and the buffer model that the value codec writes into and
//! reads out of. Everything above this crate (the value engine, the
//! streaming sessions) treats frames as opaque and defers every bit
//! decision to the functions defined here, so the format stays bit-exact
//! in one place.
//!
//! # Design
//!
//! The crate is split into four modules:
//!
//! - [`tag`] defines the 3-bit and 5-bit type tags and the masks shared by
//!   the head codec and the dispatchers above.
//! - [`head`] reads and writes frame heads: the three VARLEN length modes,
//!   the integer head, the usertype head, and the single-byte
//!   boolean/null/float heads.
//! - [`output`] provides the [`Output`] sink trait with two
//!   implementations: [`GrowBuf`] for one-shot in-memory encoding and
//!   [`ChunkWriter`] for chunked file-backed encoding.
//! - [`input`] provides the [`Input`] source trait with [`SliceReader`]
//!   (in-memory, optionally zero-copy), [`BorrowedReader`] (plain slices,
//!   used by the validator), and [`ChunkReader`] (file-backed with
//!   refill).
//!
//! # Invariants
//!
//! - All multi-byte scalars on the wire are little-endian.
//! - Writers emit the shortest length mode unless a streaming header is
//!   forced; readers accept Mode 1 with either `00` or `10` in bits 3-4.
//! - A frame head never exceeds [`MAX_HEAD`] bytes.
//! - [`Output::put`] and [`Input::take`] are only called after a matching
//!   [`Output::ensure`] / [`Input::require`] succeeded.
//!
//! # Errors
//!
//! [`EncodeError`] covers sink failures (allocation, chunk overflow, I/O);
//! [`DecodeError`] covers source failures (truncation, bad head bytes,
//! chunk overflow, I/O, bad file offsets). Both are `thiserror` enums that
//! the engine and stream crates wrap.
//!
//! # Examples
//!
//! Write and read back a Mode 2 head:
//!
//! ```
//! use wire::{GrowBuf, SliceReader, Input, Output, head, tag};
//!
//! let mut out = GrowBuf::new();
//! out.ensure(head::MAX_HEAD).unwrap();
//! head::write_varlen(&mut out, tag::STRNG, 300);
//!
//! let mut input = SliceReader::new(out.into_bytes().into(), false);
//! input.require(1).unwrap();
//! let first = input.take_u8();
//! assert_eq!(first & 0b111, tag::STRNG);
//! assert_eq!(head::read_varlen_len(&mut input, first).unwrap(), 300);
//! ```

pub mod head;
pub mod input;
pub mod output;
pub mod tag;

mod error;

pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use head::MAX_HEAD;
pub use input::{BorrowedReader, ChunkReader, Input, SliceReader};
pub use output::{ChunkWriter, GrowBuf, Output};

/// Default chunk size of the file-backed encode, decode, and validation
/// paths: 32 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;
