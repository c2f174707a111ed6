//! Sinks for encoded frames.
//!
//! The value codec writes through the [`Output`] trait: it calls
//! [`Output::ensure`] with the upper bound of the bytes it is about to
//! emit, then writes them with the infallible `put` methods. The two
//! implementations cover the two encode paths of the format: [`GrowBuf`]
//! grows an in-memory buffer under the allocation governor's guidance, and
//! [`ChunkWriter`] flushes a fixed-size chunk to a file whenever the next
//! frame would not fit.

use std::fs::File;
use std::io::Write;

use tracing::trace;

use crate::error::{EncodeError, EncodeResult};

/// Destination for encoded frames.
///
/// Callers must invoke [`Output::ensure`] with an upper bound before any
/// sequence of `put` calls; after a successful `ensure(n)`, up to `n`
/// bytes may be written without further checks.
pub trait Output {
    /// Guarantees at least `need` contiguous writable bytes.
    fn ensure(&mut self, need: usize) -> EncodeResult<()>;

    /// Appends raw bytes. Only valid after a covering [`Output::ensure`].
    fn put(&mut self, bytes: &[u8]);

    /// Appends one byte. Only valid after a covering [`Output::ensure`].
    fn put_u8(&mut self, byte: u8);

    /// Total bytes emitted through this sink so far.
    fn written(&self) -> usize;
}

/// Growable in-memory sink for one-shot encoding.
///
/// Growth is deliberately explicit rather than delegated to `Vec`'s
/// doubling: each shortfall reserves `need + slack` further bytes, where
/// `slack` comes from the allocation governor, and is counted so the
/// governor can adapt after the encode completes.
#[derive(Debug)]
pub struct GrowBuf {
    buf: Vec<u8>,
    slack: usize,
    reallocs: u32,
}

impl Default for GrowBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowBuf {
    /// Creates an empty buffer with the minimum growth slack.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            slack: 64,
            reallocs: 0,
        }
    }

    /// Creates a buffer with `initial` bytes of capacity and the given
    /// growth slack, failing cleanly if the reservation is refused.
    pub fn with_capacity(initial: usize, slack: usize) -> EncodeResult<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(initial)?;
        Ok(Self {
            buf,
            slack,
            reallocs: 0,
        })
    }

    /// Number of times the buffer had to grow.
    pub fn reallocs(&self) -> u32 {
        self.reallocs
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the sink and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Output for GrowBuf {
    fn ensure(&mut self, need: usize) -> EncodeResult<()> {
        if self.buf.len() + need > self.buf.capacity() {
            self.reallocs += 1;
            self.buf.try_reserve_exact(need + self.slack)?;
        }
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn put_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    fn written(&self) -> usize {
        self.buf.len()
    }
}

/// Fixed-capacity chunk sink that appends to a file.
///
/// When a frame would overflow the chunk, the filled part is flushed to
/// the file and the chunk restarts; a frame larger than the whole chunk is
/// an error rather than a silent growth, since the chunk size is the
/// caller's memory bound.
#[derive(Debug)]
pub struct ChunkWriter {
    file: File,
    chunk: Vec<u8>,
    capacity: usize,
    flushed: u64,
}

impl ChunkWriter {
    /// Wraps a file opened for appending with a chunk of `chunk_size` bytes.
    pub fn new(file: File, chunk_size: usize) -> Self {
        Self::with_buffer(file, Vec::with_capacity(chunk_size), chunk_size)
    }

    /// Like [`ChunkWriter::new`], but reuses an existing chunk allocation.
    pub fn with_buffer(file: File, mut chunk: Vec<u8>, chunk_size: usize) -> Self {
        chunk.clear();
        Self {
            file,
            chunk,
            capacity: chunk_size,
            flushed: 0,
        }
    }

    /// Writes the filled part of the chunk to the file and restarts it.
    pub fn flush(&mut self) -> EncodeResult<()> {
        if !self.chunk.is_empty() {
            trace!(bytes = self.chunk.len(), "flushing encode chunk");
            self.file.write_all(&self.chunk)?;
            self.flushed += self.chunk.len() as u64;
            self.chunk.clear();
        }
        Ok(())
    }

    /// Bytes already flushed to the file.
    pub fn flushed(&self) -> u64 {
        self.flushed
    }

    /// Flushes the tail and returns the underlying file.
    pub fn finish(mut self) -> EncodeResult<File> {
        self.flush()?;
        self.file.flush()?;
        Ok(self.file)
    }

    /// Flushes the tail and returns the file together with the chunk
    /// allocation, so a session can reuse it for the next call.
    pub fn into_parts(mut self) -> EncodeResult<(File, Vec<u8>)> {
        self.flush()?;
        self.file.flush()?;
        Ok((self.file, self.chunk))
    }
}

impl Output for ChunkWriter {
    fn ensure(&mut self, need: usize) -> EncodeResult<()> {
        if need > self.capacity - self.chunk.len() {
            if need > self.capacity {
                return Err(EncodeError::ValueTooLarge {
                    need,
                    capacity: self.capacity,
                });
            }
            self.flush()?;
        }
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) {
        self.chunk.extend_from_slice(bytes);
    }

    fn put_u8(&mut self, byte: u8) {
        self.chunk.push(byte);
    }

    fn written(&self) -> usize {
        self.flushed as usize + self.chunk.len()
    }
}
