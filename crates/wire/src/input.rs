//! Sources for encoded frames.
//!
//! The decoder and validator read through the [`Input`] trait, mirroring
//! the write side: [`Input::require`] makes a span of bytes available,
//! the `take` methods consume it. [`SliceReader`] serves the one-shot
//! decode path over in-memory bytes and can hand out zero-copy views;
//! [`ChunkReader`] serves the file-backed paths, refilling its chunk from
//! the file whenever a frame crosses the chunk boundary.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use bytes::Bytes;
use tracing::trace;

use crate::error::{DecodeError, DecodeResult};

/// Source of encoded frames.
///
/// Callers invoke [`Input::require`] before consuming; after a successful
/// `require(n)`, up to `n` bytes may be taken without further checks.
pub trait Input {
    /// Makes at least `need` bytes available at the cursor.
    fn require(&mut self, need: usize) -> DecodeResult<()>;

    /// Returns the byte at the cursor without consuming it. Only valid
    /// after a covering [`Input::require`].
    fn peek_u8(&self) -> u8;

    /// Consumes one byte. Only valid after a covering [`Input::require`].
    fn take_u8(&mut self) -> u8;

    /// Consumes `len` bytes and borrows them. Only valid after a covering
    /// [`Input::require`].
    fn take(&mut self, len: usize) -> &[u8];

    /// Consumes `len` bytes into a [`Bytes`] handle, sharing the backing
    /// storage when the source supports it. Performs its own bounds check.
    fn take_shared(&mut self, len: usize) -> DecodeResult<Bytes>;

    /// Advances the cursor past `len` bytes without decoding them.
    fn skip(&mut self, len: usize) -> DecodeResult<()>;

    /// Total bytes consumed from this source so far.
    fn consumed(&self) -> usize;
}

/// In-memory source over refcounted bytes.
///
/// With `referenced` set, [`Input::take_shared`] returns slices that share
/// the input's backing storage, so string and byte values decoded from
/// this reader stay valid for as long as any of them is alive. Without it
/// every view is copied out.
#[derive(Debug)]
pub struct SliceReader {
    data: Bytes,
    pos: usize,
    referenced: bool,
}

impl SliceReader {
    /// Wraps `data`, optionally handing out zero-copy views.
    pub fn new(data: Bytes, referenced: bool) -> Self {
        Self {
            data,
            pos: 0,
            referenced,
        }
    }

    /// Bytes left between the cursor and the end of the input.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl Input for SliceReader {
    fn require(&mut self, need: usize) -> DecodeResult<()> {
        // Subtraction form so that wire-supplied lengths near usize::MAX
        // cannot overflow the check.
        if need > self.data.len() - self.pos {
            return Err(DecodeError::Truncated {
                need,
                available: self.data.len() - self.pos,
            });
        }
        Ok(())
    }

    fn peek_u8(&self) -> u8 {
        self.data[self.pos]
    }

    fn take_u8(&mut self) -> u8 {
        let byte = self.data[self.pos];
        self.pos += 1;
        byte
    }

    fn take(&mut self, len: usize) -> &[u8] {
        let span = &self.data[self.pos..self.pos + len];
        self.pos += len;
        span
    }

    fn take_shared(&mut self, len: usize) -> DecodeResult<Bytes> {
        self.require(len)?;
        let span = if self.referenced {
            self.data.slice(self.pos..self.pos + len)
        } else {
            Bytes::copy_from_slice(&self.data[self.pos..self.pos + len])
        };
        self.pos += len;
        Ok(span)
    }

    fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.require(len)?;
        self.pos += len;
        Ok(())
    }

    fn consumed(&self) -> usize {
        self.pos
    }
}

/// Borrowing source over a plain byte slice.
///
/// Used where no view needs to outlive the read, most notably by the
/// validator; [`Input::take_shared`] copies if it is ever called.
#[derive(Debug)]
pub struct BorrowedReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BorrowedReader<'a> {
    /// Wraps a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl Input for BorrowedReader<'_> {
    fn require(&mut self, need: usize) -> DecodeResult<()> {
        if need > self.data.len() - self.pos {
            return Err(DecodeError::Truncated {
                need,
                available: self.data.len() - self.pos,
            });
        }
        Ok(())
    }

    fn peek_u8(&self) -> u8 {
        self.data[self.pos]
    }

    fn take_u8(&mut self) -> u8 {
        let byte = self.data[self.pos];
        self.pos += 1;
        byte
    }

    fn take(&mut self, len: usize) -> &[u8] {
        let span = &self.data[self.pos..self.pos + len];
        self.pos += len;
        span
    }

    fn take_shared(&mut self, len: usize) -> DecodeResult<Bytes> {
        self.require(len)?;
        let span = Bytes::copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(span)
    }

    fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.require(len)?;
        self.pos += len;
        Ok(())
    }

    fn consumed(&self) -> usize {
        self.pos
    }
}

/// File-backed source reading through a fixed-size chunk.
///
/// On shortfall the reader advances its base offset by the bytes consumed
/// so far, seeks, and refills the chunk from the file; unconsumed tail
/// bytes are simply re-read. A short read near the end of the file shrinks
/// the effective window. Frames wider than the chunk are rejected, since
/// the chunk size is the caller's memory bound.
#[derive(Debug)]
pub struct ChunkReader {
    file: File,
    chunk: Vec<u8>,
    pos: usize,
    base: u64,
    start: u64,
    capacity: usize,
}

impl ChunkReader {
    /// Positions `file` at `start_offset` and prefills the first chunk.
    pub fn new(file: File, start_offset: u64, chunk_size: usize) -> DecodeResult<Self> {
        Self::with_buffer(file, start_offset, chunk_size, Vec::new())
    }

    /// Like [`ChunkReader::new`], but reuses an existing chunk allocation.
    pub fn with_buffer(
        mut file: File,
        start_offset: u64,
        chunk_size: usize,
        mut chunk: Vec<u8>,
    ) -> DecodeResult<Self> {
        file.seek(SeekFrom::Start(start_offset))
            .map_err(|source| DecodeError::FileOffset {
                offset: start_offset,
                source,
            })?;

        chunk.resize(chunk_size, 0);
        let filled = read_full(&mut file, &mut chunk)?;
        chunk.truncate(filled);

        Ok(Self {
            file,
            chunk,
            pos: 0,
            base: start_offset,
            start: start_offset,
            capacity: chunk_size,
        })
    }

    /// Returns the chunk allocation for reuse by a later read.
    pub fn into_buffer(self) -> Vec<u8> {
        self.chunk
    }

    /// Absolute file offset of the cursor.
    pub fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    fn refill(&mut self, need: usize) -> DecodeResult<()> {
        self.base += self.pos as u64;
        self.pos = 0;

        self.file
            .seek(SeekFrom::Start(self.base))
            .map_err(|source| DecodeError::FileOffset {
                offset: self.base,
                source,
            })?;

        self.chunk.resize(self.capacity, 0);
        let filled = read_full(&mut self.file, &mut self.chunk)?;
        self.chunk.truncate(filled);
        trace!(offset = self.base, bytes = filled, "refilled decode chunk");

        if need > filled {
            return Err(DecodeError::Truncated {
                need,
                available: filled,
            });
        }
        Ok(())
    }
}

impl Input for ChunkReader {
    fn require(&mut self, need: usize) -> DecodeResult<()> {
        if need <= self.chunk.len() - self.pos {
            return Ok(());
        }
        if need > self.capacity {
            return Err(DecodeError::ValueTooLarge {
                need,
                capacity: self.capacity,
            });
        }
        self.refill(need)
    }

    fn peek_u8(&self) -> u8 {
        self.chunk[self.pos]
    }

    fn take_u8(&mut self) -> u8 {
        let byte = self.chunk[self.pos];
        self.pos += 1;
        byte
    }

    fn take(&mut self, len: usize) -> &[u8] {
        let span = &self.chunk[self.pos..self.pos + len];
        self.pos += len;
        span
    }

    fn take_shared(&mut self, len: usize) -> DecodeResult<Bytes> {
        self.require(len)?;
        let span = Bytes::copy_from_slice(&self.chunk[self.pos..self.pos + len]);
        self.pos += len;
        Ok(span)
    }

    fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.require(len)?;
        self.pos += len;
        Ok(())
    }

    fn consumed(&self) -> usize {
        (self.base + self.pos as u64 - self.start) as usize
    }
}

/// Reads until `buf` is full or the file ends; returns the filled length.
fn read_full(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
