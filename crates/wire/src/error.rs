//! Error types shared by the wire-level sinks and sources.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Result type for wire-level writes.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for wire-level reads.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while writing frames into a sink.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The growable buffer could not reserve the requested capacity.
    #[error("failed to reserve encode buffer capacity: {0}")]
    Memory(#[from] TryReserveError),
    /// A single value does not fit the chunk buffer of a streaming sink.
    #[error("value requires {need} bytes while the chunk limit is {capacity}")]
    ValueTooLarge {
        /// Bytes the value needs contiguously.
        need: usize,
        /// Capacity of the chunk buffer.
        capacity: usize,
    },
    /// The backing file rejected a write or flush.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

/// Errors raised while reading frames from a source.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The source ended inside a frame.
    #[error("invalid or corrupted data: needed {need} more bytes, {available} available")]
    Truncated {
        /// Bytes the current frame still needs.
        need: usize,
        /// Bytes left in the source.
        available: usize,
    },
    /// The head byte does not name a known type.
    #[error("invalid or corrupted data: unknown type tag {0:#04x}")]
    UnknownTag(u8),
    /// An integer head declared a payload width outside `1..=8`.
    #[error("invalid or corrupted data: integer width {0} out of range")]
    IntegerWidth(u8),
    /// A single value does not fit the chunk buffer of a file-backed source.
    #[error("value requires {need} bytes while the chunk limit is {capacity}")]
    ValueTooLarge {
        /// Bytes the value needs contiguously.
        need: usize,
        /// Capacity of the chunk buffer.
        capacity: usize,
    },
    /// The backing file could not be positioned or read at an offset.
    #[error("failed to read file at offset {offset}: {source}")]
    FileOffset {
        /// Absolute file offset of the failed operation.
        offset: u64,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The backing file rejected a read.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn truncated_error_reports_both_sides() {
        let err = DecodeError::Truncated {
            need: 8,
            available: 3,
        };
        let text = err.to_string();
        assert!(text.contains('8'));
        assert!(text.contains('3'));
    }

    #[test]
    fn io_error_converts_from_std() {
        let err: DecodeError = io::Error::new(ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn file_offset_error_keeps_source() {
        use std::error::Error;

        let err = DecodeError::FileOffset {
            offset: 42,
            source: io::Error::new(ErrorKind::UnexpectedEof, "short read"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("42"));
    }
}
