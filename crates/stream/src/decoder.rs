//! The streaming decoder session.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use engine::decode::decode_value;
use engine::{UserTypeDecoders, Value};
use wire::tag;
use wire::ChunkReader;

use crate::error::{StreamError, StreamResult};
use crate::{ContainerKind, DecoderOptions};

/// Reads items of a streamed container back in chunks.
///
/// The session records the container kind and item count from the
/// streaming header at open time and then serves [`StreamDecoder::read`]
/// calls of any granularity, keeping its file offset between calls. A
/// single value wider than the chunk size is an error.
#[derive(Debug)]
pub struct StreamDecoder {
    path: PathBuf,
    kind: ContainerKind,
    chunk_size: usize,
    nitems: u64,
    start_offset: u64,
    curr_offset: u64,
    buffer: Option<Vec<u8>>,
    custom_types: Option<Arc<UserTypeDecoders>>,
}

impl StreamDecoder {
    /// Opens a streamed file for reading.
    ///
    /// The nine bytes at `file_offset` must hold a streaming container
    /// header; its kind and remaining item count seed the session.
    pub fn open(path: impl AsRef<Path>, opts: &DecoderOptions) -> StreamResult<Self> {
        if opts.chunk_size == 0 {
            return Err(StreamError::InvalidChunkSize);
        }
        let path = path.as_ref().to_path_buf();

        let mut file = File::open(&path)?;
        file.seek(SeekFrom::Start(opts.file_offset))
            .map_err(|source| StreamError::FileOffset {
                offset: opts.file_offset,
                source,
            })?;

        let mut header = [0u8; tag::STREAM_HEAD];
        file.read_exact(&mut header)
            .map_err(|source| StreamError::FileOffset {
                offset: opts.file_offset,
                source,
            })?;

        if header[0] & tag::STREAM_MASK != tag::STREAM_MASK {
            return Err(StreamError::HeaderMismatch);
        }
        let kind =
            ContainerKind::from_tag(tag::tag3(header[0])).ok_or(StreamError::HeaderMismatch)?;
        let nitems = u64::from_le_bytes(
            header[1..]
                .try_into()
                .map_err(|_| StreamError::HeaderMismatch)?,
        );

        debug!(
            path = %path.display(),
            ?kind,
            nitems,
            start_offset = opts.file_offset,
            "opened stream decoder"
        );

        Ok(Self {
            path,
            kind,
            chunk_size: opts.chunk_size,
            nitems,
            start_offset: opts.file_offset,
            curr_offset: opts.file_offset + tag::STREAM_HEAD as u64,
            buffer: None,
            custom_types: opts.custom_types.clone(),
        })
    }

    /// Reads all remaining items into one container.
    pub fn read(&mut self) -> StreamResult<Value> {
        self.read_with(None, false, None)
    }

    /// Reads up to `num_items` items (pairs for maps), capped at the
    /// remaining count; `None` reads everything left. Requesting zero, or
    /// reading an exhausted stream, yields an empty container of the
    /// session's kind. `clear_memory` releases the chunk allocation after
    /// the call; `chunk_size` overrides the chunk size for this and later
    /// calls.
    pub fn read_with(
        &mut self,
        num_items: Option<u64>,
        clear_memory: bool,
        chunk_size: Option<usize>,
    ) -> StreamResult<Value> {
        if let Some(size) = chunk_size {
            if size == 0 {
                return Err(StreamError::InvalidChunkSize);
            }
            self.chunk_size = size;
            self.buffer = None;
        }

        let requested = num_items.unwrap_or(self.nitems).min(self.nitems);
        if requested == 0 {
            return Ok(match self.kind {
                ContainerKind::List => Value::List(Vec::new()),
                ContainerKind::Map => Value::Map(Vec::new()),
            });
        }

        let utypes = self.custom_types.clone();
        let file = File::open(&self.path)?;
        let buffer = self.buffer.take().unwrap_or_default();
        let mut reader =
            ChunkReader::with_buffer(file, self.curr_offset, self.chunk_size, buffer)?;

        let result = match self.kind {
            ContainerKind::List => {
                let mut items = Vec::new();
                for _ in 0..requested {
                    items.push(decode_value(&mut reader, utypes.as_deref())?);
                }
                Value::List(items)
            }
            ContainerKind::Map => {
                let mut pairs = Vec::new();
                for _ in 0..requested {
                    let key = decode_value(&mut reader, utypes.as_deref())?;
                    let val = decode_value(&mut reader, utypes.as_deref())?;
                    pairs.push((key, val));
                }
                Value::Map(pairs)
            }
        };

        self.nitems -= requested;
        self.curr_offset = reader.position();
        if clear_memory {
            self.buffer = None;
        } else {
            self.buffer = Some(reader.into_buffer());
        }

        debug!(
            items = requested,
            remaining = self.nitems,
            "stream read complete"
        );
        Ok(result)
    }

    /// File offset of the streaming header.
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// File offset of the next byte the session will read.
    pub fn curr_offset(&self) -> u64 {
        self.curr_offset
    }

    /// Items not yet read (pairs for maps).
    pub fn items_remaining(&self) -> u64 {
        self.nitems
    }

    /// The container kind recorded in the streaming header.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Ends the session, releasing the chunk allocation.
    pub fn finalize(self) {}
}
