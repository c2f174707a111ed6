//! The streaming encoder session.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use engine::encode::encode_value;
use engine::{UserTypeEncoders, Value};
use wire::head;
use wire::tag;
use wire::{ChunkWriter, Output as _};

use crate::error::{StreamError, StreamResult};
use crate::{ContainerKind, EncoderOptions};

/// Appends items of one top-level container to a file.
///
/// The session opens the file per call: each [`StreamEncoder::write`]
/// appends the item frames through a fixed-size chunk, then rewrites the
/// 8-byte item count inside the streaming header in place. Between calls
/// the file is a complete, valid encoding of everything ingested so far.
#[derive(Debug)]
pub struct StreamEncoder {
    path: PathBuf,
    kind: ContainerKind,
    chunk_size: usize,
    nitems: u64,
    start_offset: u64,
    curr_offset: u64,
    buffer: Option<Vec<u8>>,
    custom_types: Option<Arc<UserTypeEncoders>>,
}

impl StreamEncoder {
    /// Opens a streaming session on `path`.
    ///
    /// Without `resume_stream` or `preserve_file`, the file is truncated
    /// and a fresh zero-count header is written at `file_offset`. With
    /// `preserve_file`, existing contents stay and the stream starts at
    /// end of file. With `resume_stream`, the header at `file_offset` is
    /// verified and its kind and item count are adopted; the `kind`
    /// argument is ignored in that case.
    pub fn open(
        path: impl AsRef<Path>,
        kind: ContainerKind,
        opts: &EncoderOptions,
    ) -> StreamResult<Self> {
        if opts.chunk_size == 0 {
            return Err(StreamError::InvalidChunkSize);
        }
        let path = path.as_ref().to_path_buf();

        let (kind, nitems, start_offset, curr_offset) = if opts.resume_stream {
            Self::open_resumed(&path, opts.file_offset)?
        } else if opts.preserve_file {
            let mut file = OpenOptions::new().append(true).create(true).open(&path)?;
            let start_offset = file.seek(SeekFrom::End(0))?;
            file.write_all(&head::stream_head(kind.tag(), 0))?;
            (kind, 0, start_offset, start_offset + tag::STREAM_HEAD as u64)
        } else {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?;
            if opts.file_offset > 0 {
                file.seek(SeekFrom::Start(opts.file_offset))
                    .map_err(|source| StreamError::FileOffset {
                        offset: opts.file_offset,
                        source,
                    })?;
            }
            file.write_all(&head::stream_head(kind.tag(), 0))?;
            (
                kind,
                0,
                opts.file_offset,
                opts.file_offset + tag::STREAM_HEAD as u64,
            )
        };

        debug!(
            path = %path.display(),
            ?kind,
            nitems,
            start_offset,
            "opened stream encoder"
        );

        Ok(Self {
            path,
            kind,
            chunk_size: opts.chunk_size,
            nitems,
            start_offset,
            curr_offset,
            buffer: None,
            custom_types: opts.custom_types.clone(),
        })
    }

    /// Verifies and adopts an existing streaming header.
    fn open_resumed(path: &Path, file_offset: u64) -> StreamResult<(ContainerKind, u64, u64, u64)> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(file_offset))
            .map_err(|source| StreamError::FileOffset {
                offset: file_offset,
                source,
            })?;

        let mut header = [0u8; tag::STREAM_HEAD];
        file.read_exact(&mut header)
            .map_err(|source| StreamError::FileOffset {
                offset: file_offset,
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

        // Appending continues at the current end of the file.
        let end = file.seek(SeekFrom::End(0))?;
        Ok((kind, nitems, file_offset, end))
    }

    /// Appends the top-level children of `value` to the stream.
    ///
    /// `value` must be of the session's container kind; lists contribute
    /// one item per element, maps one item per pair. Nested containers
    /// inside the children are encoded with minimal headers.
    pub fn write(&mut self, value: &Value) -> StreamResult<()> {
        self.write_with(value, false, None)
    }

    /// Like [`StreamEncoder::write`], optionally releasing the chunk
    /// allocation afterwards or overriding the chunk size for this and
    /// later calls.
    pub fn write_with(
        &mut self,
        value: &Value,
        clear_memory: bool,
        chunk_size: Option<usize>,
    ) -> StreamResult<()> {
        if let Some(size) = chunk_size {
            if size == 0 {
                return Err(StreamError::InvalidChunkSize);
            }
            self.chunk_size = size;
            self.buffer = None;
        }

        let utypes = self.custom_types.clone();
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let buffer = self
            .buffer
            .take()
            .unwrap_or_else(|| Vec::with_capacity(self.chunk_size));
        let mut writer = ChunkWriter::with_buffer(file, buffer, self.chunk_size);

        let ingested = match (self.kind, value) {
            (ContainerKind::List, Value::List(items)) => {
                for item in items {
                    encode_value(&mut writer, item, utypes.as_deref())?;
                }
                items.len() as u64
            }
            (ContainerKind::Map, Value::Map(pairs)) => {
                for (key, val) in pairs {
                    encode_value(&mut writer, key, utypes.as_deref())?;
                    encode_value(&mut writer, val, utypes.as_deref())?;
                }
                pairs.len() as u64
            }
            _ => {
                return Err(StreamError::KindMismatch {
                    expected: self.kind,
                    got: value.kind_name(),
                });
            }
        };

        let appended = writer.written() as u64;
        let (file, buffer) = writer.into_parts()?;
        drop(file);
        self.buffer = Some(buffer);

        self.nitems += ingested;
        self.patch_count()?;
        self.curr_offset += appended;

        if clear_memory {
            self.buffer = None;
        }

        debug!(items = ingested, total = self.nitems, "stream write complete");
        Ok(())
    }

    /// Rewrites the 8-byte item count inside the streaming header.
    fn patch_count(&self) -> StreamResult<()> {
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let count_offset = self.start_offset + 1;
        file.seek(SeekFrom::Start(count_offset))
            .map_err(|source| StreamError::FileOffset {
                offset: count_offset,
                source,
            })?;
        file.write_all(&self.nitems.to_le_bytes())?;
        Ok(())
    }

    /// File offset of the streaming header.
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// File offset of the next byte the session will write.
    pub fn curr_offset(&self) -> u64 {
        self.curr_offset
    }

    /// Items ingested so far, as recorded in the file header.
    pub fn items_written(&self) -> u64 {
        self.nitems
    }

    /// Ends the session, releasing the chunk allocation.
    ///
    /// Every write already left the file consistent; this only frees the
    /// session's memory.
    pub fn finalize(self) {}
}
