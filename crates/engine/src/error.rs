//! Error types of the value codec and validator.

use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while encoding a value.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value kind has no wire representation and no usertype encoder.
    #[error("received unsupported datatype '{0}'")]
    UnsupportedType(&'static str),
    /// An integer does not fit the 8-byte wire limit.
    #[error("integer does not fit the 8-byte wire limit")]
    IntegerTooWide,
    /// A usertype encoder reported a failure.
    #[error("custom type encoder failed: {0}")]
    Custom(String),
    /// Sink failure: allocation, chunk overflow, or file I/O.
    #[error(transparent)]
    Wire(#[from] wire::EncodeError),
    /// The output file could not be created or written.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

/// Errors raised while decoding a value.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input held no bytes at all.
    #[error("received an empty input")]
    EmptyInput,
    /// A string payload was not valid UTF-8.
    #[error("invalid or corrupted data: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    /// A usertype frame named an index with no registered decoder.
    #[error("no decoder registered for usertype index {0}")]
    UnknownUserType(u8),
    /// A usertype decoder reported a failure.
    #[error("custom type decoder failed: {0}")]
    Custom(String),
    /// Source failure: truncation, bad head bytes, chunk overflow, file I/O.
    #[error(transparent)]
    Wire(#[from] wire::DecodeError),
    /// The input file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

/// Errors raised by the validator entry points.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The data is not a valid encoding and raising was requested.
    #[error("the received data does not appear to be valid")]
    Invalid,
    /// The input file could not be positioned at the requested offset.
    #[error("failed to read file at offset {offset}: {source}")]
    FileOffset {
        /// Absolute file offset of the failed operation.
        offset: u64,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The input file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}
