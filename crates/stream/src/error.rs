//! Error types for streaming sessions.

use std::io;

use thiserror::Error;

use crate::ContainerKind;

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can occur in a streaming session.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A written value's kind does not match the session's container kind.
    #[error("streaming requires values to continue as the same kind: session holds {expected:?}, got '{got}'")]
    KindMismatch {
        /// The session's container kind.
        expected: ContainerKind,
        /// Kind name of the offending value.
        got: &'static str,
    },
    /// The file does not start with a streaming container header.
    #[error("the existing file data does not match the streaming header expectations")]
    HeaderMismatch,
    /// The chunk size option was zero.
    #[error("chunk_size must be larger than zero")]
    InvalidChunkSize,
    /// Encoding a streamed item failed.
    #[error(transparent)]
    Encode(#[from] engine::EncodeError),
    /// Decoding a streamed item failed.
    #[error(transparent)]
    Decode(#[from] engine::DecodeError),
    /// The file could not be positioned or read at an offset.
    #[error("failed to access file at offset {offset}: {source}")]
    FileOffset {
        /// Absolute file offset of the failed operation.
        offset: u64,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file could not be opened, created, or written.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

impl From<wire::EncodeError> for StreamError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err.into())
    }
}

impl From<wire::DecodeError> for StreamError {
    fn from(err: wire::DecodeError) -> Self {
        match err {
            wire::DecodeError::FileOffset { offset, source } => {
                Self::FileOffset { offset, source }
            }
            other => Self::Decode(other.into()),
        }
    }
}
