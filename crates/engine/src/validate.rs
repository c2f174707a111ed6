//! Structural validation of encoded data.
//!
//! The validator runs the frame-head codec over the input and advances
//! past payloads without materializing values: variable-length leaves are
//! skipped by their declared length, containers recurse (pairs count
//! twice), usertype frames are skipped whether or not a decoder is
//! registered. Any overread, reserved tag, or malformed head makes the
//! input invalid. The file form reads through a chunked window, refilling
//! like the streaming decoder does.

use std::fs::File;
use std::io;
use std::path::Path;

use wire::head;
use wire::tag;
use wire::{BorrowedReader, ChunkReader, Input};

use crate::error::ValidateError;

/// Options of [`validate_with`].
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Offset of the first frame inside a file input.
    pub file_offset: u64,
    /// Window size for file inputs.
    pub chunk_size: usize,
    /// Raise [`ValidateError::Invalid`] instead of returning `false`.
    pub err_on_invalid: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            file_offset: 0,
            chunk_size: wire::DEFAULT_CHUNK_SIZE,
            err_on_invalid: false,
        }
    }
}

/// The input of [`validate_with`].
#[derive(Debug, Clone, Copy)]
pub enum ValidateInput<'a> {
    /// Validate in-memory bytes.
    Bytes(&'a [u8]),
    /// Validate a file window.
    File(&'a Path),
}

/// Checks whether `encoded` starts with one complete, well-formed frame.
pub fn validate(encoded: &[u8]) -> bool {
    matches!(
        validate_with(ValidateInput::Bytes(encoded), &ValidateOptions::default()),
        Ok(true)
    )
}

/// Validates bytes or a file window with explicit options.
///
/// File open, seek, and read failures are reported as errors in their own
/// right; they are environmental, not a verdict on the data.
pub fn validate_with(input: ValidateInput<'_>, opts: &ValidateOptions) -> Result<bool, ValidateError> {
    let ok = match input {
        ValidateInput::Bytes(data) => {
            let mut reader = BorrowedReader::new(data);
            walk(&mut reader).is_ok()
        }
        ValidateInput::File(path) => {
            if opts.chunk_size == 0 {
                return Err(ValidateError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "chunk_size must be larger than zero",
                )));
            }
            let file = File::open(path)?;
            let end_offset = file.metadata()?.len();

            match ChunkReader::new(file, opts.file_offset, opts.chunk_size) {
                Ok(mut reader) => {
                    // The traversal itself never reads past the window,
                    // so a final position check closes the file case.
                    walk(&mut reader).is_ok() && reader.position() <= end_offset
                }
                Err(wire::DecodeError::FileOffset { offset, source }) => {
                    return Err(ValidateError::FileOffset { offset, source });
                }
                Err(wire::DecodeError::Io(source)) => return Err(ValidateError::Io(source)),
                Err(_) => false,
            }
        }
    };

    if ok {
        Ok(true)
    } else if opts.err_on_invalid {
        Err(ValidateError::Invalid)
    } else {
        Ok(false)
    }
}

/// Walks one frame, recursing through containers.
fn walk<I: Input + ?Sized>(input: &mut I) -> wire::DecodeResult<()> {
    input.require(1)?;
    let byte = input.take_u8();

    match tag::tag3(byte) {
        tag::ARRAY | tag::DICTN => {
            let count = head::read_varlen_len(input, byte)?;
            let children = if tag::tag3(byte) == tag::DICTN {
                count.saturating_mul(2)
            } else {
                count
            };
            for _ in 0..children {
                walk(input)?;
            }
            Ok(())
        }
        tag::BYTES | tag::STRNG => {
            let len = head::read_varlen_len(input, byte)?;
            input.skip(len)
        }
        tag::INTGR => {
            let nbytes = head::integer_width(byte)?;
            input.skip(nbytes)
        }
        tag::UTYPE => {
            let len = head::read_utype_len(input)?;
            input.skip(len)
        }
        _ => match tag::tag5(byte) {
            tag::FLOAT => input.skip(8),
            tag::BOOLF | tag::BOOLT | tag::NONTP => Ok(()),
            _ => Err(wire::DecodeError::UnknownTag(byte)),
        },
    }
}
